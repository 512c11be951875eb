use std::mem::size_of;

use bytemuck::{AnyBitPattern, Pod, Zeroable};
use tracing::{debug, trace};

use crate::bin::read_pod_at;
use crate::error::OpenError;
use crate::header::{ArchiveHeader, Version};
use crate::mapping::{Mapping, View};
use crate::strings;
use crate::tree::Folder;

/// The record layouts of one schema version.
///
/// v4 and v5 differ only in the width of table counts and item indices
/// (16 vs 32 bits); everything else is shared. The open-time version
/// switch picks one implementor and the whole directory engine is
/// monomorphised over it.
pub trait Schema {
    type DirectoryHeader: DirectoryHeaderRecord;
    type Section: SectionRecord;
    type Folder: FolderRecord;

    fn version() -> Version;
}

/// Offset/count pair describing one packed table. Offsets are relative
/// to the start of the extended header region.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub offset: u32,
    pub count: u32,
}

/// The table of tables at the start of the extended header region.
pub trait DirectoryHeaderRecord: AnyBitPattern {
    fn section_table(&self) -> Table;
    fn folder_table(&self) -> Table;
    fn file_table(&self) -> Table;
    fn string_table(&self) -> Table;
}

/// A top-level named grouping of folders and files.
pub trait SectionRecord: AnyBitPattern {
    fn alias(&self) -> &[u8; 64];
    fn name(&self) -> &[u8; 64];
    fn folder_range(&self) -> (u32, u32);
    fn file_range(&self) -> (u32, u32);
    fn folder_root(&self) -> u32;
}

/// A folder record: a name plus half-open child ranges into the folder
/// and file tables.
pub trait FolderRecord: AnyBitPattern {
    fn name_offset(&self) -> u32;
    fn folder_range(&self) -> (u32, u32);
    fn file_range(&self) -> (u32, u32);
}

/// On-disk file record, identical in v4 and v5.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct FileRecord {
    pub name_offset: u32,
    /// Payload offset relative to the archive's file-data offset.
    pub data_offset: u32,
    pub size_on_disk: u32,
    pub size: u32,
    pub time_modified: u32,
    pub reserved: u8,
    /// 0 = stored, anything else = raw deflate stream.
    pub storage: u8,
}

impl FileRecord {
    pub fn is_stored(&self) -> bool {
        self.storage == 0
    }
}

/// The 260-byte record immediately preceding each file payload. The
/// CRC32 covers the uncompressed file bytes.
#[repr(C, packed)]
#[derive(Clone, Copy, Zeroable, Pod)]
pub struct PayloadHeader {
    pub name: [u8; 256],
    pub crc32: u32,
}

/// Parsed extended header of one archive.
///
/// Holds the directory region as a single sub-view and resolves all
/// table access through bounds-checked offset arithmetic against it.
/// Every invariant is checked up front in [`Directory::map`]; nothing
/// of a rejected archive is observable.
pub struct Directory<S: Schema> {
    mapping: Mapping,
    view: View,
    header: S::DirectoryHeader,
    file_data_offset: u32,
}

impl<S: Schema> Directory<S> {
    /// Map the extended header region and validate every table bound,
    /// name offset, index range and payload extent.
    pub fn map(mapping: Mapping, header_length: u32, file_data_offset: u32) -> Result<Directory<S>, OpenError> {
        let view = mapping
            .view(ArchiveHeader::SIZE as u64, header_length as u64)
            .map_err(|_| OpenError::HeaderRegionTruncated)?;
        let header: S::DirectoryHeader =
            read_pod_at(&view, 0).ok_or(OpenError::HeaderRegionTruncated)?;

        let dir = Directory { mapping, view, header, file_data_offset };
        dir.check_tables()?;
        dir.check_records()?;
        debug!(
            version = %S::version(),
            sections = dir.section_count(),
            folders = dir.folder_count(),
            files = dir.file_count(),
            "mapped SGA directory"
        );
        Ok(dir)
    }

    pub fn section_count(&self) -> u32 {
        self.header.section_table().count
    }

    pub fn folder_count(&self) -> u32 {
        self.header.folder_table().count
    }

    pub fn file_count(&self) -> u32 {
        self.header.file_table().count
    }

    pub fn section(&self, index: u32) -> Result<S::Section, OpenError> {
        self.table_entry(self.header.section_table(), index)
            .ok_or(OpenError::SectionTableOverflow)
    }

    pub fn folder(&self, index: u32) -> Result<S::Folder, OpenError> {
        self.table_entry(self.header.folder_table(), index)
            .ok_or(OpenError::FolderTableOverflow)
    }

    pub fn file(&self, index: u32) -> Result<FileRecord, OpenError> {
        self.table_entry(self.header.file_table(), index)
            .ok_or(OpenError::FileTableOverflow)
    }

    fn table_entry<T: AnyBitPattern>(&self, table: Table, index: u32) -> Option<T> {
        if index >= table.count {
            return None;
        }
        read_pod_at(&self.view, table.offset as usize + size_of::<T>() * index as usize)
    }

    /// Name at `offset` in the string table. The table spans from its
    /// recorded offset to the end of the directory region.
    pub fn name_at(&self, offset: u32) -> Result<&str, OpenError> {
        let table = &self.view[self.header.string_table().offset as usize..];
        strings::zstring_at(table, offset)
    }

    /// Section whose folder index range contains the given folder id.
    pub fn section_of_folder(&self, id: u32) -> Result<Option<S::Section>, OpenError> {
        self.find_section(|section| section.folder_range(), id)
    }

    /// Section whose file index range contains the given file id.
    pub fn section_of_file(&self, id: u32) -> Result<Option<S::Section>, OpenError> {
        self.find_section(|section| section.file_range(), id)
    }

    fn find_section<R>(&self, range: R, id: u32) -> Result<Option<S::Section>, OpenError>
    where R: Fn(&S::Section) -> (u32, u32) {
        for at in 0..self.section_count() {
            let section = self.section(at)?;
            let (start, end) = range(&section);
            if id >= start && id < end {
                return Ok(Some(section));
            }
        }
        Ok(None)
    }

    /// The payload header immediately preceding the file's data.
    pub fn payload_header(&self, file: &FileRecord) -> Result<PayloadHeader, OpenError> {
        let size = size_of::<PayloadHeader>() as u64;
        let start = self.payload_start(file).checked_sub(size)
            .ok_or(OpenError::PayloadOutOfRange)?;
        let view = self.mapping.view(start, size)?;
        read_pod_at(&view, 0).ok_or(OpenError::PayloadOutOfRange)
    }

    /// View over the file's stored bytes.
    pub fn payload(&self, file: &FileRecord) -> Result<View, OpenError> {
        let size_on_disk = file.size_on_disk;
        Ok(self.mapping.view(self.payload_start(file), size_on_disk as u64)?)
    }

    /// One view covering the payload header and the stored bytes.
    pub fn payload_with_header(&self, file: &FileRecord) -> Result<View, OpenError> {
        let header_size = size_of::<PayloadHeader>() as u64;
        let start = self.payload_start(file).checked_sub(header_size)
            .ok_or(OpenError::PayloadOutOfRange)?;
        let size_on_disk = file.size_on_disk;
        Ok(self.mapping.view(start, size_on_disk as u64 + header_size)?)
    }

    fn payload_start(&self, file: &FileRecord) -> u64 {
        self.file_data_offset as u64 + file.data_offset as u64
    }

    /// Build the logical folder tree: one child folder per section
    /// alias, then the section's root folder record expanded
    /// recursively.
    pub fn build_root(&self) -> Result<Folder, OpenError> {
        let mut root = Folder::root();
        for at in 0..self.section_count() {
            let section = self.section(at)?;
            let alias = strings::ascii_fixed(section.alias());
            trace!(section = %alias, "expanding section");
            let folder = root.add_folder(&alias, None);
            self.expand(folder, section.folder_root())?;
        }
        Ok(root)
    }

    /// Expand one folder record under `parent`.
    ///
    /// Folder-record names may be full paths; only the basename after
    /// the last `/` or `\` names the node, which folds repeated path
    /// prefixes and merges siblings sharing a basename. An empty name
    /// attaches the children directly to `parent`.
    fn expand(&self, parent: &mut Folder, index: u32) -> Result<(), OpenError> {
        let record = self.folder(index)?;
        let name = self.name_at(record.name_offset())?;
        let parent = if name.is_empty() {
            parent
        } else {
            parent.add_folder(basename(name), Some(index))
        };
        let (folder_start, folder_end) = record.folder_range();
        for child in folder_start..folder_end {
            self.expand(parent, child)?;
        }
        let (file_start, file_end) = record.file_range();
        for at in file_start..file_end {
            let file = self.file(at)?;
            parent.add_file(self.name_at(file.name_offset)?, at);
        }
        Ok(())
    }

    fn check_tables(&self) -> Result<(), OpenError> {
        let len = self.view.len() as u64;
        let sections = self.header.section_table();
        if sections.count > 0 && table_end::<S::Section>(sections) > len {
            return Err(OpenError::SectionTableOverflow);
        }
        let folders = self.header.folder_table();
        if folders.count > 0 && table_end::<S::Folder>(folders) > len {
            return Err(OpenError::FolderTableOverflow);
        }
        let files = self.header.file_table();
        if files.count > 0 && table_end::<FileRecord>(files) > len {
            return Err(OpenError::FileTableOverflow);
        }
        if self.header.string_table().offset as u64 > len {
            return Err(OpenError::StringTableOverflow);
        }
        Ok(())
    }

    fn check_records(&self) -> Result<(), OpenError> {
        let folder_count = self.folder_count();
        let file_count = self.file_count();

        for at in 0..self.section_count() {
            let section = self.section(at)?;
            check_range(section.folder_range(), folder_count, OpenError::FolderTableOverflow)?;
            check_range(section.file_range(), file_count, OpenError::FileTableOverflow)?;
            if section.folder_root() >= folder_count {
                return Err(OpenError::FolderTableOverflow);
            }
        }

        for at in 0..folder_count {
            let folder = self.folder(at)?;
            self.name_at(folder.name_offset())?;
            let (start, end) = folder.folder_range();
            check_range((start, end), folder_count, OpenError::FolderTableOverflow)?;
            // Children must come after their parent in the table, so
            // the recursive tree build terminates on hostile input.
            if start < end && start <= at {
                return Err(OpenError::FolderTableOverflow);
            }
            check_range(folder.file_range(), file_count, OpenError::FileTableOverflow)?;
        }

        for at in 0..file_count {
            let file = self.file(at)?;
            self.name_at(file.name_offset)?;
            self.check_payload(&file)?;
        }
        Ok(())
    }

    fn check_payload(&self, file: &FileRecord) -> Result<(), OpenError> {
        let start = self.payload_start(file);
        if start < size_of::<PayloadHeader>() as u64 {
            return Err(OpenError::PayloadOutOfRange);
        }
        if start + file.size_on_disk as u64 > self.mapping.len() {
            return Err(OpenError::PayloadOutOfRange);
        }
        Ok(())
    }
}

fn table_end<T>(table: Table) -> u64 {
    table.offset as u64 + size_of::<T>() as u64 * table.count as u64
}

fn check_range((start, end): (u32, u32), count: u32, err: OpenError) -> Result<(), OpenError> {
    if start == end || (start < end && end <= count) {
        Ok(())
    } else {
        Err(err)
    }
}

/// Strip everything up to and including the last `/`, then the last
/// `\`.
fn basename(name: &str) -> &str {
    let name = match name.rfind('/') {
        Some(at) => &name[at + 1..],
        None => name,
    };
    match name.rfind('\\') {
        Some(at) => &name[at + 1..],
        None => name,
    }
}
