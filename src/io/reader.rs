//! Log Reader
//!
//! Sequential, bounds-checked reads over an in-memory view of the file.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

use bytes::Bytes;

use crate::error::Result;

/// Cursor over the full contents of a store file
pub struct LogReader {
    /// Whole file, shared with any payload views handed out
    data: Bytes,
    /// Current read position
    pos: u64,
}

impl LogReader {
    /// Read the whole file at `path` into memory
    pub fn open(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Ok(Self::from_bytes(Bytes::from(data)))
    }

    /// Wrap an existing buffer
    pub fn from_bytes(data: Bytes) -> Self {
        Self { data, pos: 0 }
    }

    /// Read exactly `N` bytes, advancing the cursor
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        if !self.can_read(N as u64) {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("need {} bytes at offset {}, file is {} bytes", N, self.pos, self.len()),
            )
            .into());
        }

        let start = self.pos as usize;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[start..start + N]);
        self.pos += N as u64;
        Ok(out)
    }

    /// Current read offset
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Move the cursor; may point past the end, which reads as end-of-stream
    pub fn seek(&mut self, offset: u64) {
        self.pos = offset;
    }

    /// True once the cursor has reached or passed the end of the file
    pub fn at_end(&self) -> bool {
        self.pos >= self.len()
    }

    /// True if `n` more bytes are available from the cursor
    pub fn can_read(&self, n: u64) -> bool {
        self.remaining() >= n
    }

    /// Bytes left between the cursor and the end of the file
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.pos)
    }

    /// Total file size
    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Zero-copy view of `len` bytes at `offset`
    pub fn slice(&self, offset: u64, len: u64) -> Option<Bytes> {
        let end = offset.checked_add(len)?;
        if end > self.len() {
            return None;
        }
        Some(self.data.slice(offset as usize..end as usize))
    }
}
