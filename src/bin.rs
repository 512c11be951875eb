use std::mem::size_of;

use bytemuck::AnyBitPattern;

/// Copy a packed record out of `bytes` at `offset`.
///
/// Records are copied rather than cast in place: table offsets inside
/// an archive carry no alignment guarantee, and no reference into the
/// source bytes escapes the bounds check.
pub fn read_pod_at<T: AnyBitPattern>(bytes: &[u8], offset: usize) -> Option<T> {
    let end = offset.checked_add(size_of::<T>())?;
    let raw = bytes.get(offset..end)?;
    Some(bytemuck::pod_read_unaligned(raw))
}

/// [`read_pod_at`] at offset 0.
pub fn read_pod<T: AnyBitPattern>(bytes: &[u8]) -> Option<T> {
    read_pod_at(bytes, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_records() {
        let bytes = [0xff, 0x78, 0x56, 0x34, 0x12, 0xff];
        assert_eq!(read_pod_at::<u32>(&bytes, 1), Some(0x1234_5678));
    }

    #[test]
    fn rejects_short_buffers() {
        let bytes = [0u8; 3];
        assert_eq!(read_pod_at::<u32>(&bytes, 0), None);
        assert_eq!(read_pod_at::<u32>(&bytes, usize::MAX), None);
    }
}
