use adler32::RollingAdler32;
use crc32fast::Hasher;

/// Incremental IEEE CRC32 (reflected, polynomial `0xEDB88320`).
///
/// `seed` is the checksum of everything hashed so far; pass `0` for the
/// first chunk. Feeding a buffer in slices yields the same value as one
/// shot: `crc32(crc32(0, a), b) == crc32(0, ab)`.
pub fn crc32(seed: u32, bytes: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(seed);
    hasher.update(bytes);
    hasher.finalize()
}

/// Incremental RFC 1950 Adler32, same contract as [`crc32`].
///
/// Pass `1` as the seed for the first chunk.
pub fn adler32(seed: u32, bytes: &[u8]) -> u32 {
    let mut hash = RollingAdler32::from_value(seed);
    hash.update_buffer(bytes);
    hash.hash()
}
