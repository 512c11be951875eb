use std::io::{self, Read, Seek, SeekFrom};

use thiserror::Error;

use crate::error::OpenError;
use crate::mapping::View;

/// Failure while decoding a deflated payload.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("deflate error: memory exhausted")]
    MemoryExhausted,

    #[error("deflate error: output buffer too small")]
    OutputBufferTooSmall,

    #[error("deflate error: malformed data")]
    MalformedData,

    #[error("deflate support is not compiled in")]
    Unsupported,

    #[error("deflate error: unknown")]
    Unknown,
}

/// Failure while creating a file stream.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("{0}")]
    Open(#[from] OpenError),

    #[error("{0}")]
    Decode(#[from] DecodeError),
}

enum Source {
    Mapped(View),
    Memory(Vec<u8>),
}

impl AsRef<[u8]> for Source {
    fn as_ref(&self) -> &[u8] {
        match self {
            Source::Mapped(view) => view,
            Source::Memory(buf) => buf,
        }
    }
}

/// A seekable byte stream over one file's contents.
///
/// Stored payloads are served straight out of the mapping without
/// copying; deflated payloads are inflated into an owned buffer when
/// the stream is created and released when it is dropped.
pub struct FileStream {
    cursor: io::Cursor<Source>,
}

impl FileStream {
    pub(crate) fn mapped(view: View) -> FileStream {
        FileStream { cursor: io::Cursor::new(Source::Mapped(view)) }
    }

    pub(crate) fn inflated(buf: Vec<u8>) -> FileStream {
        FileStream { cursor: io::Cursor::new(Source::Memory(buf)) }
    }

    /// Total stream length in bytes.
    pub fn len(&self) -> usize {
        self.cursor.get_ref().as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole payload, independent of the read position.
    pub fn as_bytes(&self) -> &[u8] {
        self.cursor.get_ref().as_ref()
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cursor.read(buf)
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

/// Inflate a raw deflate stream into a buffer of at most `size` bytes.
#[cfg(feature = "deflate")]
pub(crate) fn inflate(bytes: &[u8], size: usize) -> Result<Vec<u8>, DecodeError> {
    use libflate::deflate::Decoder;

    let mut out = Vec::new();
    out.try_reserve_exact(size).map_err(|_| DecodeError::MemoryExhausted)?;
    let mut decoder = Decoder::new(bytes).take(size as u64 + 1);
    match decoder.read_to_end(&mut out) {
        Ok(_) if out.len() > size => Err(DecodeError::OutputBufferTooSmall),
        Ok(_) => Ok(out),
        Err(err) => Err(classify(err)),
    }
}

#[cfg(feature = "deflate")]
fn classify(err: io::Error) -> DecodeError {
    match err.kind() {
        io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => DecodeError::MalformedData,
        io::ErrorKind::OutOfMemory => DecodeError::MemoryExhausted,
        _ => DecodeError::Unknown,
    }
}
