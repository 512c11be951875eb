use std::fs;
use std::io;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("view of {len} bytes at offset {offset} is outside the mapped region")]
pub struct OutOfBounds {
    pub offset: u64,
    pub len: u64,
}

enum Region {
    File(Mmap),
    Memory(Vec<u8>),
}

impl Region {
    fn bytes(&self) -> &[u8] {
        match self {
            Region::File(map) => map,
            Region::Memory(buf) => buf,
        }
    }
}

/// A read-only archive region that hands out bounded windows of itself.
///
/// The region is either a file mapped into memory or a plain byte
/// buffer. Cloning is cheap; clones and all [`View`]s share ownership
/// of the underlying bytes, so a view can outlive the [`Mapping`] it
/// was created from without dangling.
#[derive(Clone)]
pub struct Mapping {
    region: Arc<Region>,
}

impl Mapping {
    /// Map a file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Mapping> {
        let file = fs::File::open(path)?;
        // Safety: the map is read-only and this crate never truncates
        // or writes the backing file.
        let map = unsafe { Mmap::map(&file)? };
        Ok(Mapping { region: Arc::new(Region::File(map)) })
    }

    /// Wrap an in-memory buffer.
    pub fn from_vec(buf: Vec<u8>) -> Mapping {
        Mapping { region: Arc::new(Region::Memory(buf)) }
    }

    /// Total size of the mapped region in bytes.
    pub fn len(&self) -> u64 {
        self.region.bytes().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A window of `len` bytes starting at `offset`.
    pub fn view(&self, offset: u64, len: u64) -> Result<View, OutOfBounds> {
        let end = offset.checked_add(len).ok_or(OutOfBounds { offset, len })?;
        if end > self.len() {
            return Err(OutOfBounds { offset, len });
        }
        Ok(View {
            region: Arc::clone(&self.region),
            offset: offset as usize,
            len: len as usize,
        })
    }
}

/// A bounded read-only window into a [`Mapping`].
#[derive(Clone)]
pub struct View {
    region: Arc<Region>,
    offset: usize,
    len: usize,
}

impl View {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Deref for View {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.region.bytes()[self.offset..self.offset + self.len]
    }
}

impl AsRef<[u8]> for View {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_yields_the_requested_window() {
        let mapping = Mapping::from_vec(vec![0, 1, 2, 3, 4, 5, 6, 7]);
        let view = mapping.view(2, 4)
            .unwrap_or_else(|err| panic!("could not map view {}", err));
        assert_eq!(&view[..], &[2, 3, 4, 5]);
    }

    #[test]
    fn view_may_span_the_whole_region() {
        let mapping = Mapping::from_vec(vec![9; 16]);
        let view = mapping.view(0, 16)
            .unwrap_or_else(|err| panic!("could not map view {}", err));
        assert_eq!(view.len(), 16);
    }

    #[test]
    fn view_past_the_end_is_rejected() {
        let mapping = Mapping::from_vec(vec![0; 16]);
        assert!(mapping.view(0, 17).is_err());
        assert!(mapping.view(16, 1).is_err());
        assert!(mapping.view(u64::MAX, 2).is_err());
    }

    #[test]
    fn views_keep_the_region_alive() {
        let mapping = Mapping::from_vec(vec![7; 4]);
        let view = mapping.view(0, 4)
            .unwrap_or_else(|err| panic!("could not map view {}", err));
        drop(mapping);
        assert_eq!(&view[..], &[7, 7, 7, 7]);
    }
}
