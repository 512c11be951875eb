use bytemuck::{Pod, Zeroable};

use crate::directory::{Directory, DirectoryHeaderRecord, FolderRecord, Schema, SectionRecord, Table};
use crate::header::Version;

/// Directory header with 16-bit table counts.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct DirectoryHeaderV4 {
    pub section_offset: u32,
    pub section_count: u16,
    pub folder_offset: u32,
    pub folder_count: u16,
    pub file_offset: u32,
    pub file_count: u16,
    pub string_table_offset: u32,
    pub string_table_count: u16,
}

impl DirectoryHeaderRecord for DirectoryHeaderV4 {
    fn section_table(&self) -> Table {
        Table { offset: self.section_offset, count: self.section_count as u32 }
    }
    fn folder_table(&self) -> Table {
        Table { offset: self.folder_offset, count: self.folder_count as u32 }
    }
    fn file_table(&self) -> Table {
        Table { offset: self.file_offset, count: self.file_count as u32 }
    }
    fn string_table(&self) -> Table {
        Table { offset: self.string_table_offset, count: self.string_table_count as u32 }
    }
}

/// Section record with 16-bit item indices.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct SectionV4 {
    pub alias: [u8; 64],
    pub name: [u8; 64],
    pub folder_start: u16,
    pub folder_end: u16,
    pub file_start: u16,
    pub file_end: u16,
    pub folder_root: u16,
}

impl SectionRecord for SectionV4 {
    fn alias(&self) -> &[u8; 64] {
        &self.alias
    }
    fn name(&self) -> &[u8; 64] {
        &self.name
    }
    fn folder_range(&self) -> (u32, u32) {
        (self.folder_start as u32, self.folder_end as u32)
    }
    fn file_range(&self) -> (u32, u32) {
        (self.file_start as u32, self.file_end as u32)
    }
    fn folder_root(&self) -> u32 {
        self.folder_root as u32
    }
}

/// Folder record with 16-bit item indices.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Zeroable, Pod)]
pub struct FolderV4 {
    pub name_offset: u32,
    pub folder_start: u16,
    pub folder_end: u16,
    pub file_start: u16,
    pub file_end: u16,
}

impl FolderRecord for FolderV4 {
    fn name_offset(&self) -> u32 {
        self.name_offset
    }
    fn folder_range(&self) -> (u32, u32) {
        (self.folder_start as u32, self.folder_end as u32)
    }
    fn file_range(&self) -> (u32, u32) {
        (self.file_start as u32, self.file_end as u32)
    }
}

/// Marker for the v4.0 schema.
pub enum V4 {}

impl Schema for V4 {
    type DirectoryHeader = DirectoryHeaderV4;
    type Section = SectionV4;
    type Folder = FolderV4;

    fn version() -> Version {
        Version::V4
    }
}

pub type DirectoryV4 = Directory<V4>;
