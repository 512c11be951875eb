use std::fmt;

use chrono::{Local, TimeZone};

/// Archive-level attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAttribute {
    VersionMajor,
    VersionMinor,
    FileMd5,
    Name,
    HeaderMd5,
}

impl PackageAttribute {
    pub const ALL: [PackageAttribute; 5] = [
        PackageAttribute::VersionMajor,
        PackageAttribute::VersionMinor,
        PackageAttribute::FileMd5,
        PackageAttribute::Name,
        PackageAttribute::HeaderMd5,
    ];

    /// Display name reported to hosts.
    pub fn name(self) -> &'static str {
        match self {
            PackageAttribute::VersionMajor => "Major Version",
            PackageAttribute::VersionMinor => "Minor Version",
            PackageAttribute::FileMd5 => "File MD5",
            PackageAttribute::Name => "Name",
            PackageAttribute::HeaderMd5 => "Header MD5",
        }
    }
}

/// Item-level attributes. The section pair applies to folders and
/// files; the rest are file-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAttribute {
    SectionAlias,
    SectionName,
    Modified,
    Type,
    Crc,
}

impl ItemAttribute {
    pub const ALL: [ItemAttribute; 5] = [
        ItemAttribute::SectionAlias,
        ItemAttribute::SectionName,
        ItemAttribute::Modified,
        ItemAttribute::Type,
        ItemAttribute::Crc,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ItemAttribute::SectionAlias => "Section Alias",
            ItemAttribute::SectionName => "Section Name",
            ItemAttribute::Modified => "Modified",
            ItemAttribute::Type => "Type",
            ItemAttribute::Crc => "CRC",
        }
    }
}

/// A resolved attribute: display name plus value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: &'static str,
    pub value: AttrValue,
}

impl Attribute {
    pub fn unsigned(name: &'static str, value: u32) -> Attribute {
        Attribute { name, value: AttrValue::Unsigned { value, hex: false } }
    }

    pub fn hex(name: &'static str, value: u32) -> Attribute {
        Attribute { name, value: AttrValue::Unsigned { value, hex: true } }
    }

    pub fn text(name: &'static str, value: String) -> Attribute {
        Attribute { name, value: AttrValue::Text(value) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Unsigned { value: u32, hex: bool },
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Unsigned { value, hex: true } => write!(f, "0x{:08x}", value),
            AttrValue::Unsigned { value, hex: false } => write!(f, "{}", value),
            AttrValue::Text(value) => f.write_str(value),
        }
    }
}

/// Seconds since the epoch rendered as local time in the fixed `%c`
/// layout. `None` when the timestamp does not map to a local time.
pub fn format_modified(seconds: u32) -> Option<String> {
    Local.timestamp_opt(seconds as i64, 0)
        .single()
        .map(|time| time.format("%c").to_string())
}
