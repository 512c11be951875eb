use std::mem::size_of;
use std::path::Path;

use tracing::debug;

use crate::attr::{self, Attribute, ItemAttribute, PackageAttribute};
use crate::bin::read_pod_at;
use crate::directory::{Directory, FileRecord, PayloadHeader, SectionRecord};
use crate::error::Result;
use crate::header::{ArchiveHeader, Version};
use crate::mapping::{Mapping, View};
use crate::stream::{FileStream, StreamError};
use crate::strings;
use crate::tree::{File, Folder, Item};
use crate::v4::DirectoryV4;
use crate::v5::DirectoryV5;
use crate::validate::{checksum_chunked, Validation};

/// Package type name reported to hosts.
pub const TYPE: &str = "SGA archive";
/// File extension handled by this package type.
pub const EXTENSION: &str = "sga";
/// Human-readable package description.
pub const DESCRIPTION: &str = "Archive File";

/// The directory parser of whichever schema version the header named.
enum SomeDirectory {
    V4(DirectoryV4),
    V5(DirectoryV5),
}

impl SomeDirectory {
    fn build_root(&self) -> Result<Folder> {
        match self {
            SomeDirectory::V4(dir) => dir.build_root(),
            SomeDirectory::V5(dir) => dir.build_root(),
        }
    }

    fn file(&self, id: u32) -> Result<FileRecord> {
        match self {
            SomeDirectory::V4(dir) => dir.file(id),
            SomeDirectory::V5(dir) => dir.file(id),
        }
    }

    fn payload(&self, file: &FileRecord) -> Result<View> {
        match self {
            SomeDirectory::V4(dir) => dir.payload(file),
            SomeDirectory::V5(dir) => dir.payload(file),
        }
    }

    fn payload_with_header(&self, file: &FileRecord) -> Result<View> {
        match self {
            SomeDirectory::V4(dir) => dir.payload_with_header(file),
            SomeDirectory::V5(dir) => dir.payload_with_header(file),
        }
    }

    fn payload_header(&self, file: &FileRecord) -> Result<PayloadHeader> {
        match self {
            SomeDirectory::V4(dir) => dir.payload_header(file),
            SomeDirectory::V5(dir) => dir.payload_header(file),
        }
    }

    fn section_strings_of_folder(&self, id: u32) -> Result<Option<(String, String)>> {
        match self {
            SomeDirectory::V4(dir) => Ok(section_strings(dir.section_of_folder(id)?)),
            SomeDirectory::V5(dir) => Ok(section_strings(dir.section_of_folder(id)?)),
        }
    }

    fn section_strings_of_file(&self, id: u32) -> Result<Option<(String, String)>> {
        match self {
            SomeDirectory::V4(dir) => Ok(section_strings(dir.section_of_file(id)?)),
            SomeDirectory::V5(dir) => Ok(section_strings(dir.section_of_file(id)?)),
        }
    }
}

fn section_strings<T: SectionRecord>(section: Option<T>) -> Option<(String, String)> {
    section.map(|section| {
        (strings::ascii_fixed(section.alias()), strings::ascii_fixed(section.name()))
    })
}

/// An opened SGA archive: validated header and directory plus the
/// directory tree built from them.
///
/// All table bounds, name offsets, index ranges and payload extents are
/// checked during [`Archive::read`]; a violated invariant rejects the
/// archive and nothing of it is observable.
pub struct Archive {
    header: ArchiveHeader,
    version: Version,
    directory: SomeDirectory,
    root: Folder,
}

impl Archive {
    /// Memory-map an archive file and open it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Archive> {
        Archive::read(Mapping::open(path)?)
    }

    /// Open an archive over a mapped region.
    pub fn read(mapping: Mapping) -> Result<Archive> {
        let (header, version) = ArchiveHeader::read(&mapping)?;
        let header_length = header.header_length;
        let file_data_offset = header.file_data_offset;
        let directory = match version {
            Version::V4 => SomeDirectory::V4(Directory::map(mapping, header_length, file_data_offset)?),
            Version::V5 => SomeDirectory::V5(Directory::map(mapping, header_length, file_data_offset)?),
        };
        let root = directory.build_root()?;
        debug!(%version, "opened SGA archive");
        Ok(Archive { header, version, directory, root })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// Root of the directory tree. Each section contributes one child
    /// folder named by its alias.
    pub fn root(&self) -> &Folder {
        &self.root
    }

    /// Archive-level attribute value.
    pub fn attribute(&self, attribute: PackageAttribute) -> Attribute {
        let name = attribute.name();
        match attribute {
            PackageAttribute::VersionMajor => {
                Attribute::unsigned(name, self.header.major_version as u32)
            }
            PackageAttribute::VersionMinor => {
                Attribute::unsigned(name, self.header.minor_version as u32)
            }
            PackageAttribute::FileMd5 => {
                Attribute::text(name, strings::to_hex(&self.header.file_md5))
            }
            PackageAttribute::Name => {
                let units = self.header.name;
                Attribute::text(name, strings::utf16_fixed(&units))
            }
            PackageAttribute::HeaderMd5 => {
                Attribute::text(name, strings::to_hex(&self.header.header_md5))
            }
        }
    }

    /// All archive-level attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = Attribute> + '_ {
        IntoIterator::into_iter(PackageAttribute::ALL)
            .map(move |attribute| self.attribute(attribute))
    }

    /// Item-level attribute value; `None` when the attribute does not
    /// apply to the item or the item resolves to no section.
    pub fn item_attribute(&self, item: &Item, attribute: ItemAttribute) -> Option<Attribute> {
        match item {
            Item::Folder(folder) => self.folder_attribute(folder, attribute),
            Item::File(file) => self.file_attribute(file, attribute),
        }
    }

    fn folder_attribute(&self, folder: &Folder, attribute: ItemAttribute) -> Option<Attribute> {
        let id = folder.id?;
        match attribute {
            ItemAttribute::SectionAlias | ItemAttribute::SectionName => {
                let (alias, name) = self.directory.section_strings_of_folder(id).ok()??;
                Some(match attribute {
                    ItemAttribute::SectionAlias => Attribute::text(attribute.name(), alias),
                    _ => Attribute::text(attribute.name(), name),
                })
            }
            _ => None,
        }
    }

    fn file_attribute(&self, file: &File, attribute: ItemAttribute) -> Option<Attribute> {
        let record = self.directory.file(file.id).ok()?;
        match attribute {
            ItemAttribute::SectionAlias | ItemAttribute::SectionName => {
                let (alias, name) = self.directory.section_strings_of_file(file.id).ok()??;
                Some(match attribute {
                    ItemAttribute::SectionAlias => Attribute::text(attribute.name(), alias),
                    _ => Attribute::text(attribute.name(), name),
                })
            }
            ItemAttribute::Modified => {
                let formatted = attr::format_modified(record.time_modified)?;
                Some(Attribute::text(attribute.name(), formatted))
            }
            ItemAttribute::Type => {
                Some(Attribute::unsigned(attribute.name(), record.storage as u32))
            }
            ItemAttribute::Crc => {
                let payload = self.directory.payload_header(&record).ok()?;
                Some(Attribute::hex(attribute.name(), payload.crc32))
            }
        }
    }

    /// Whether the file's payload can be extracted by this build.
    /// Stored files always are; deflated files need deflate support.
    pub fn extractable(&self, file: &File) -> Result<bool> {
        let record = self.directory.file(file.id)?;
        Ok(record.is_stored() || cfg!(feature = "deflate"))
    }

    /// Uncompressed size in bytes.
    pub fn file_size(&self, file: &File) -> Result<u32> {
        Ok(self.directory.file(file.id)?.size)
    }

    /// Stored size in bytes (compressed size for deflated files).
    pub fn file_size_on_disk(&self, file: &File) -> Result<u32> {
        Ok(self.directory.file(file.id)?.size_on_disk)
    }

    /// Create a seekable byte stream over the file's contents.
    ///
    /// Stored payloads are served from the mapping without copying;
    /// deflated payloads are inflated into an owned buffer first, which
    /// is released when the stream is dropped.
    pub fn create_stream(&self, file: &File) -> Result<FileStream, StreamError> {
        let record = self.directory.file(file.id)?;
        let payload = self.directory.payload(&record)?;
        if record.is_stored() {
            return Ok(FileStream::mapped(payload));
        }
        self.inflate_stream(&record, &payload)
    }

    #[cfg(feature = "deflate")]
    fn inflate_stream(&self, record: &FileRecord, payload: &[u8]) -> Result<FileStream, StreamError> {
        let size = record.size;
        let buf = crate::stream::inflate(payload, size as usize).map_err(|err| {
            debug!(%err, "could not inflate file payload");
            err
        })?;
        Ok(FileStream::inflated(buf))
    }

    #[cfg(not(feature = "deflate"))]
    fn inflate_stream(&self, _: &FileRecord, _: &[u8]) -> Result<FileStream, StreamError> {
        Err(StreamError::Decode(crate::stream::DecodeError::Unsupported))
    }

    /// Check the file's uncompressed bytes against the CRC32 stored in
    /// its payload header.
    ///
    /// `progress` receives `(bytes_done, bytes_total)` once up front
    /// and then after every 32 KiB chunk; returning `true` cancels.
    /// Mapping and inflate failures yield [`Validation::Error`], never
    /// an early return through `?`.
    pub fn validate<P>(&self, file: &File, progress: &mut P) -> Validation
    where P: FnMut(u64, u64) -> bool {
        let record = match self.directory.file(file.id) {
            Ok(record) => record,
            Err(_) => return Validation::Error,
        };
        if !record.is_stored() && !cfg!(feature = "deflate") {
            return Validation::AssumedOk;
        }

        let view = match self.directory.payload_with_header(&record) {
            Ok(view) => view,
            Err(_) => return Validation::Error,
        };
        let expected = match read_pod_at::<PayloadHeader>(&view, 0) {
            Some(header) => header.crc32,
            None => return Validation::Error,
        };
        let payload = &view[size_of::<PayloadHeader>()..];
        let total = record.size as u64;

        if record.is_stored() {
            checksum_chunked(payload, total, expected, progress)
        } else {
            self.validate_inflated(payload, &record, expected, total, progress)
        }
    }

    #[cfg(feature = "deflate")]
    fn validate_inflated<P>(
        &self,
        payload: &[u8],
        record: &FileRecord,
        expected: u32,
        total: u64,
        progress: &mut P,
    ) -> Validation
    where P: FnMut(u64, u64) -> bool {
        let size = record.size;
        match crate::stream::inflate(payload, size as usize) {
            Ok(buf) => checksum_chunked(&buf, total, expected, progress),
            Err(err) => {
                debug!(%err, "could not inflate payload for validation");
                Validation::Error
            }
        }
    }

    #[cfg(not(feature = "deflate"))]
    fn validate_inflated<P>(
        &self,
        _: &[u8],
        _: &FileRecord,
        _: u32,
        _: u64,
        _: &mut P,
    ) -> Validation
    where P: FnMut(u64, u64) -> bool {
        Validation::AssumedOk
    }
}
