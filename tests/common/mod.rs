#![allow(dead_code)]

use std::mem::size_of;

use bytemuck::bytes_of;
use sga::checksum::crc32;
use sga::directory::{FileRecord, PayloadHeader};
use sga::header::{ArchiveHeader, SIGNATURE};
use sga::v4::{DirectoryHeaderV4, FolderV4, SectionV4};
use sga::v5::{DirectoryHeaderV5, FolderV5, SectionV5};

pub const FILE_MD5: [u8; 16] = [
    0xde, 0xad, 0xbe, 0xef, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];
pub const HEADER_MD5: [u8; 16] = [0x22; 16];

/// Byte offset of `header_length` inside the archive header.
pub const HEADER_LENGTH_OFFSET: usize = 172;
/// Byte offset of `file_data_offset` inside the archive header.
pub const FILE_DATA_OFFSET_OFFSET: usize = 176;

pub struct FileSpec {
    pub name: &'static str,
    pub data: Vec<u8>,
    pub deflated: bool,
    pub mtime: u32,
    /// Overrides the payload-header CRC (for corruption fixtures).
    pub crc: Option<u32>,
}

impl FileSpec {
    pub fn stored(name: &'static str, data: &[u8], mtime: u32) -> FileSpec {
        FileSpec { name, data: data.to_vec(), deflated: false, mtime, crc: None }
    }

    pub fn deflated(name: &'static str, data: &[u8], mtime: u32) -> FileSpec {
        FileSpec { name, data: data.to_vec(), deflated: true, mtime, crc: None }
    }
}

pub struct FolderSpec {
    pub name: &'static str,
    pub folders: (u32, u32),
    pub files: (u32, u32),
    /// Overrides the record's string-table offset (for bounds fixtures).
    pub name_offset_override: Option<u32>,
}

impl FolderSpec {
    pub fn new(name: &'static str, folders: (u32, u32), files: (u32, u32)) -> FolderSpec {
        FolderSpec { name, folders, files, name_offset_override: None }
    }
}

pub struct SectionSpec {
    pub alias: &'static str,
    pub name: &'static str,
    pub folders: (u32, u32),
    pub files: (u32, u32),
    pub root: u32,
}

impl SectionSpec {
    pub fn new(
        alias: &'static str,
        name: &'static str,
        folders: (u32, u32),
        files: (u32, u32),
        root: u32,
    ) -> SectionSpec {
        SectionSpec { alias, name, folders, files, root }
    }
}

pub struct ArchiveSpec {
    pub major: u16,
    pub name: &'static str,
    pub sections: Vec<SectionSpec>,
    pub folders: Vec<FolderSpec>,
    pub files: Vec<FileSpec>,
}

/// Assemble a byte-exact archive from the spec: fixed header, directory
/// tables, string table, then one payload header + payload per file.
pub fn build(spec: &ArchiveSpec) -> Vec<u8> {
    let mut table: Vec<u8> = Vec::new();
    let mut folder_names = Vec::new();
    for folder in &spec.folders {
        folder_names.push(table.len() as u32);
        table.extend_from_slice(folder.name.as_bytes());
        table.push(0);
    }
    let mut file_names = Vec::new();
    for file in &spec.files {
        file_names.push(table.len() as u32);
        table.extend_from_slice(file.name.as_bytes());
        table.push(0);
    }

    let mut payloads = Vec::new();
    for file in &spec.files {
        let stored = if file.deflated { deflate(&file.data) } else { file.data.clone() };
        let crc = file.crc.unwrap_or_else(|| crc32(0, &file.data));
        payloads.push((stored, crc));
    }

    let v4 = spec.major == 4;
    let section_size = if v4 { size_of::<SectionV4>() } else { size_of::<SectionV5>() };
    let folder_size = if v4 { size_of::<FolderV4>() } else { size_of::<FolderV5>() };

    let section_offset = if v4 { size_of::<DirectoryHeaderV4>() } else { size_of::<DirectoryHeaderV5>() };
    let folder_offset = section_offset + section_size * spec.sections.len();
    let file_offset = folder_offset + folder_size * spec.folders.len();
    let string_offset = file_offset + size_of::<FileRecord>() * spec.files.len();
    let header_length = string_offset + table.len();
    let file_data_offset = ArchiveHeader::SIZE + header_length;

    let mut out = Vec::new();

    let header = ArchiveHeader {
        signature: SIGNATURE,
        major_version: spec.major,
        minor_version: 0,
        file_md5: FILE_MD5,
        name: utf16_field(spec.name),
        header_md5: HEADER_MD5,
        header_length: header_length as u32,
        file_data_offset: file_data_offset as u32,
        reserved: 0,
    };
    out.extend_from_slice(bytes_of(&header));

    if v4 {
        let directory = DirectoryHeaderV4 {
            section_offset: section_offset as u32,
            section_count: spec.sections.len() as u16,
            folder_offset: folder_offset as u32,
            folder_count: spec.folders.len() as u16,
            file_offset: file_offset as u32,
            file_count: spec.files.len() as u16,
            string_table_offset: string_offset as u32,
            string_table_count: (spec.folders.len() + spec.files.len()) as u16,
        };
        out.extend_from_slice(bytes_of(&directory));
        for section in &spec.sections {
            let record = SectionV4 {
                alias: ascii_field(section.alias),
                name: ascii_field(section.name),
                folder_start: section.folders.0 as u16,
                folder_end: section.folders.1 as u16,
                file_start: section.files.0 as u16,
                file_end: section.files.1 as u16,
                folder_root: section.root as u16,
            };
            out.extend_from_slice(bytes_of(&record));
        }
        for (at, folder) in spec.folders.iter().enumerate() {
            let record = FolderV4 {
                name_offset: folder.name_offset_override.unwrap_or(folder_names[at]),
                folder_start: folder.folders.0 as u16,
                folder_end: folder.folders.1 as u16,
                file_start: folder.files.0 as u16,
                file_end: folder.files.1 as u16,
            };
            out.extend_from_slice(bytes_of(&record));
        }
    } else {
        let directory = DirectoryHeaderV5 {
            section_offset: section_offset as u32,
            section_count: spec.sections.len() as u32,
            folder_offset: folder_offset as u32,
            folder_count: spec.folders.len() as u32,
            file_offset: file_offset as u32,
            file_count: spec.files.len() as u32,
            string_table_offset: string_offset as u32,
            string_table_count: (spec.folders.len() + spec.files.len()) as u32,
        };
        out.extend_from_slice(bytes_of(&directory));
        for section in &spec.sections {
            let record = SectionV5 {
                alias: ascii_field(section.alias),
                name: ascii_field(section.name),
                folder_start: section.folders.0,
                folder_end: section.folders.1,
                file_start: section.files.0,
                file_end: section.files.1,
                folder_root: section.root,
            };
            out.extend_from_slice(bytes_of(&record));
        }
        for (at, folder) in spec.folders.iter().enumerate() {
            let record = FolderV5 {
                name_offset: folder.name_offset_override.unwrap_or(folder_names[at]),
                folder_start: folder.folders.0,
                folder_end: folder.folders.1,
                file_start: folder.files.0,
                file_end: folder.files.1,
            };
            out.extend_from_slice(bytes_of(&record));
        }
    }

    let mut data_offset = size_of::<PayloadHeader>() as u32;
    for (at, (stored, _)) in payloads.iter().enumerate() {
        let record = FileRecord {
            name_offset: file_names[at],
            data_offset,
            size_on_disk: stored.len() as u32,
            size: spec.files[at].data.len() as u32,
            time_modified: spec.files[at].mtime,
            reserved: 0,
            storage: spec.files[at].deflated as u8,
        };
        out.extend_from_slice(bytes_of(&record));
        data_offset += size_of::<PayloadHeader>() as u32 + stored.len() as u32;
    }

    out.extend_from_slice(&table);
    assert_eq!(out.len(), file_data_offset, "directory layout mismatch");

    for (at, (stored, crc)) in payloads.iter().enumerate() {
        let payload_header = PayloadHeader {
            name: name_field(spec.files[at].name),
            crc32: *crc,
        };
        out.extend_from_slice(bytes_of(&payload_header));
        out.extend_from_slice(stored);
    }

    out
}

pub fn patch_u32(bytes: &mut [u8], offset: usize, value: u32) {
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

#[cfg(feature = "deflate")]
fn deflate(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = libflate::deflate::Encoder::new(Vec::new());
    encoder.write_all(data)
        .unwrap_or_else(|err| panic!("could not deflate fixture data {}", err));
    encoder.finish().into_result()
        .unwrap_or_else(|err| panic!("could not finish deflate stream {}", err))
}

#[cfg(not(feature = "deflate"))]
fn deflate(_: &[u8]) -> Vec<u8> {
    panic!("deflated fixtures need the deflate feature")
}

fn ascii_field(s: &str) -> [u8; 64] {
    let mut field = [0u8; 64];
    for (at, byte) in s.bytes().take(63).enumerate() {
        field[at] = byte;
    }
    field
}

fn name_field(s: &str) -> [u8; 256] {
    let mut field = [0u8; 256];
    for (at, byte) in s.bytes().take(255).enumerate() {
        field[at] = byte;
    }
    field
}

fn utf16_field(s: &str) -> [u16; 64] {
    let mut field = [0u16; 64];
    for (at, unit) in s.encode_utf16().take(63).enumerate() {
        field[at] = unit;
    }
    field
}
