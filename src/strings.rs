use std::str;

use crate::error::OpenError;

/// Read the NUL-terminated name at `offset` inside `table`.
///
/// The read never leaves `table`; a string that runs past its end is an
/// error rather than a wild read.
pub fn zstring_at(table: &[u8], offset: u32) -> Result<&str, OpenError> {
    let tail = table.get(offset as usize..).ok_or(OpenError::NameOutOfRange)?;
    let end = tail.iter().position(|&b| b == 0).ok_or(OpenError::NameOutOfRange)?;
    str::from_utf8(&tail[..end]).map_err(|_| OpenError::NameOutOfRange)
}

/// Decode a fixed-width ASCII field, truncated at the first NUL.
pub fn ascii_fixed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Decode a fixed-width field of 16-bit code units, truncated at the
/// first NUL unit.
pub fn utf16_fixed(units: &[u16]) -> String {
    let end = units.iter().position(|&u| u == 0).unwrap_or(units.len());
    String::from_utf16_lossy(&units[..end])
}

/// Lower-case hex rendering of a byte buffer.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zstring_reads_at_offset() {
        let table = b"data\0hello.txt\0";
        assert_eq!(zstring_at(table, 0).ok(), Some("data"));
        assert_eq!(zstring_at(table, 5).ok(), Some("hello.txt"));
        assert_eq!(zstring_at(table, 4).ok(), Some(""));
    }

    #[test]
    fn zstring_without_nul_is_rejected() {
        assert!(zstring_at(b"data", 0).is_err());
    }

    #[test]
    fn zstring_offset_out_of_range_is_rejected() {
        assert!(zstring_at(b"data\0", 6).is_err());
    }

    #[test]
    fn ascii_fixed_truncates_at_nul() {
        let mut field = [0u8; 8];
        field[..4].copy_from_slice(b"data");
        assert_eq!(ascii_fixed(&field), "data");
        assert_eq!(ascii_fixed(b"full8bye"), "full8bye");
    }

    #[test]
    fn utf16_fixed_truncates_at_nul() {
        let mut units = [0u16; 8];
        for (at, unit) in "test".encode_utf16().enumerate() {
            units[at] = unit;
        }
        assert_eq!(utf16_fixed(&units), "test");
    }

    #[test]
    fn hex_is_lower_case_and_padded() {
        assert_eq!(to_hex(&[0x0f, 0xa0, 0x00]), "0fa000");
    }
}
