//! Reader for Relic's SGA game archives, versions 4.0 and 5.0.
//!
//! An archive is opened over a bounded memory-mapped region, its packed
//! tables are validated against the region up front, and the flat
//! section/folder/file tables are folded into a directory tree. Files
//! can then be streamed (stored payloads straight from the mapping,
//! deflated payloads inflated into memory) and validated against the
//! CRC32 stored next to each payload.
//!
//! The two on-disk schemas differ only in integer widths; one directory
//! engine generic over a [`directory::Schema`] covers both.

mod bin;
mod strings;

pub mod archive;
pub mod attr;
pub mod checksum;
pub mod directory;
pub mod error;
pub mod header;
pub mod mapping;
pub mod stream;
pub mod tree;
pub mod v4;
pub mod v5;
pub mod validate;

pub use crate::archive::{Archive, DESCRIPTION, EXTENSION, TYPE};
pub use crate::attr::{AttrValue, Attribute, ItemAttribute, PackageAttribute};
pub use crate::error::{OpenError, Result};
pub use crate::header::{ArchiveHeader, Version, SIGNATURE};
pub use crate::mapping::{Mapping, View};
pub use crate::stream::{DecodeError, FileStream, StreamError};
pub use crate::tree::{File, Folder, Item};
pub use crate::validate::{Validation, CHECKSUM_CHUNK};
