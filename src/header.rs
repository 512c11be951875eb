use std::fmt;
use std::mem::size_of;

use bytemuck::{Pod, Zeroable};
use tracing::debug;

use crate::bin::read_pod;
use crate::error::OpenError;
use crate::mapping::Mapping;

/// Signature at offset 0 of every SGA archive.
pub const SIGNATURE: [u8; 8] = *b"_ARCHIVE";

/// The fixed archive header at the start of the file.
///
/// Everything after it is located through `header_length` (size of the
/// extended header region) and `file_data_offset` (start of the payload
/// region).
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct ArchiveHeader {
    pub signature: [u8; 8],
    pub major_version: u16,
    pub minor_version: u16,
    pub file_md5: [u8; 16],
    /// Archive name, 64 UTF-16 code units, NUL padded.
    pub name: [u16; 64],
    pub header_md5: [u8; 16],
    pub header_length: u32,
    pub file_data_offset: u32,
    pub reserved: u32,
}

impl ArchiveHeader {
    pub const SIZE: usize = size_of::<ArchiveHeader>();

    /// Read and validate the fixed header and pick the schema version.
    pub fn read(mapping: &Mapping) -> Result<(ArchiveHeader, Version), OpenError> {
        let view = mapping
            .view(0, Self::SIZE as u64)
            .map_err(|_| OpenError::HeaderTooSmall)?;
        let header: ArchiveHeader = read_pod(&view).ok_or(OpenError::HeaderTooSmall)?;

        if header.signature != SIGNATURE {
            return Err(OpenError::BadSignature);
        }
        let version = Version::of(&header)?;

        let header_length = header.header_length;
        if Self::SIZE as u64 + header_length as u64 > mapping.len() {
            return Err(OpenError::HeaderRegionTruncated);
        }

        debug!(%version, header_length, "read SGA archive header");
        Ok((header, version))
    }
}

/// Recognized on-disk schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    V4,
    V5,
}

impl Version {
    fn of(header: &ArchiveHeader) -> Result<Version, OpenError> {
        match (header.major_version, header.minor_version) {
            (4, 0) => Ok(Version::V4),
            (5, 0) => Ok(Version::V5),
            (major, minor) => Err(OpenError::UnsupportedVersion { major, minor }),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::V4 => write!(f, "v4.0"),
            Version::V5 => write!(f, "v5.0"),
        }
    }
}
