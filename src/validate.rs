use crate::checksum::crc32;

/// Outcome of checking one file against its stored CRC32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    Ok,
    /// Integrity could not be checked: the payload is compressed and
    /// deflate support is not compiled in.
    AssumedOk,
    Corrupt,
    Canceled,
    Error,
}

/// Bytes hashed between two progress reports. Fixed so that progress
/// granularity does not depend on file size.
pub const CHECKSUM_CHUNK: usize = 0x8000;

/// Accumulate the CRC of `bytes` in [`CHECKSUM_CHUNK`] chunks and
/// compare it against `expected`.
///
/// `progress` receives `(bytes_done, total)` once before the first
/// chunk and once after each chunk; returning `true` cancels before the
/// next chunk is hashed.
pub(crate) fn checksum_chunked<P>(bytes: &[u8], total: u64, expected: u32, progress: &mut P) -> Validation
where P: FnMut(u64, u64) -> bool {
    let mut cancel = progress(0, total);
    let mut checksum = 0;
    let mut done = 0;
    while done < bytes.len() {
        if cancel {
            return Validation::Canceled;
        }
        let next = usize::min(done + CHECKSUM_CHUNK, bytes.len());
        checksum = crc32(checksum, &bytes[done..next]);
        done = next;
        cancel = progress(done as u64, total);
    }
    if checksum == expected {
        Validation::Ok
    } else {
        Validation::Corrupt
    }
}
