use bytemuck::{Pod, Zeroable};

use crate::directory::{Directory, DirectoryHeaderRecord, FolderRecord, Schema, SectionRecord, Table};
use crate::header::Version;

/// Directory header with 32-bit table counts.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct DirectoryHeaderV5 {
    pub section_offset: u32,
    pub section_count: u32,
    pub folder_offset: u32,
    pub folder_count: u32,
    pub file_offset: u32,
    pub file_count: u32,
    pub string_table_offset: u32,
    pub string_table_count: u32,
}

impl DirectoryHeaderRecord for DirectoryHeaderV5 {
    fn section_table(&self) -> Table {
        Table { offset: self.section_offset, count: self.section_count }
    }
    fn folder_table(&self) -> Table {
        Table { offset: self.folder_offset, count: self.folder_count }
    }
    fn file_table(&self) -> Table {
        Table { offset: self.file_offset, count: self.file_count }
    }
    fn string_table(&self) -> Table {
        Table { offset: self.string_table_offset, count: self.string_table_count }
    }
}

/// Section record with 32-bit item indices.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct SectionV5 {
    pub alias: [u8; 64],
    pub name: [u8; 64],
    pub folder_start: u32,
    pub folder_end: u32,
    pub file_start: u32,
    pub file_end: u32,
    pub folder_root: u32,
}

impl SectionRecord for SectionV5 {
    fn alias(&self) -> &[u8; 64] {
        &self.alias
    }
    fn name(&self) -> &[u8; 64] {
        &self.name
    }
    fn folder_range(&self) -> (u32, u32) {
        (self.folder_start, self.folder_end)
    }
    fn file_range(&self) -> (u32, u32) {
        (self.file_start, self.file_end)
    }
    fn folder_root(&self) -> u32 {
        self.folder_root
    }
}

/// Folder record with 32-bit item indices.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct FolderV5 {
    pub name_offset: u32,
    pub folder_start: u32,
    pub folder_end: u32,
    pub file_start: u32,
    pub file_end: u32,
}

impl FolderRecord for FolderV5 {
    fn name_offset(&self) -> u32 {
        self.name_offset
    }
    fn folder_range(&self) -> (u32, u32) {
        (self.folder_start, self.folder_end)
    }
    fn file_range(&self) -> (u32, u32) {
        (self.file_start, self.file_end)
    }
}

/// Marker for the v5.0 schema.
pub enum V5 {}

impl Schema for V5 {
    type DirectoryHeader = DirectoryHeaderV5;
    type Section = SectionV5;
    type Folder = FolderV5;

    fn version() -> Version {
        Version::V5
    }
}

pub type DirectoryV5 = Directory<V5>;
