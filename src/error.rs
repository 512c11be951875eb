use std::io;

use thiserror::Error;

use crate::mapping::OutOfBounds;

pub type Result<T, E = OpenError> = std::result::Result<T, E>;

/// Terminal conditions an archive can hit while opening.
///
/// All of these reject the archive outright; no partially parsed
/// directory is ever handed out.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("the file map is too small for its header")]
    HeaderTooSmall,

    #[error("the file's signature does not match")]
    BadSignature,

    #[error("unsupported SGA version v{major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("the file map is too small for its extended header")]
    HeaderRegionTruncated,

    #[error("the file map is too small for section data")]
    SectionTableOverflow,

    #[error("the file map is too small for folder data")]
    FolderTableOverflow,

    #[error("the file map is too small for file data")]
    FileTableOverflow,

    #[error("the file map is too small for string table data")]
    StringTableOverflow,

    #[error("a name offset points outside the string table")]
    NameOutOfRange,

    #[error("a file payload lies outside the mapped file")]
    PayloadOutOfRange,
}

impl From<OutOfBounds> for OpenError {
    fn from(_: OutOfBounds) -> OpenError {
        OpenError::PayloadOutOfRange
    }
}
