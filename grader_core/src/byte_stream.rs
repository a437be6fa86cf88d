use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::Result;

const BUFFER_CAPACITY: usize = 1024;

/// Buffered one-byte-at-a-time reader over a file.
///
/// The buffer is refilled only when exhausted; a zero-byte read from
/// the underlying file is end-of-stream, never "try again". The
/// cursor never runs past the bytes actually loaded.
pub struct ByteStream {
    file: File,
    buffer: [u8; BUFFER_CAPACITY],
    cursor: usize,
    loaded: usize,
}

impl ByteStream {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            file: File::open(path)?,
            buffer: [0; BUFFER_CAPACITY],
            cursor: 0,
            loaded: 0,
        })
    }

    /// Next byte of the stream, or `None` at end-of-stream.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.cursor >= self.loaded {
            let count = self.file.read(&mut self.buffer)?;
            if count == 0 {
                return Ok(None);
            }
            self.cursor = 0;
            self.loaded = count;
        }

        let byte = self.buffer[self.cursor];
        self.cursor += 1;
        Ok(Some(byte))
    }

    /// Restart the stream from the beginning of the underlying file.
    /// Invalidates the buffer so no stale bytes are replayed.
    pub fn rewind(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.cursor = 0;
        self.loaded = 0;
        Ok(())
    }
}
