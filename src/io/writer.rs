//! Log Writer
//!
//! Positioned writes into an existing store file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::SyncStrategy;
use crate::error::Result;

/// Read/write handle on a store file
pub struct LogWriter {
    file: File,
    sync_strategy: SyncStrategy,
    /// Writes since the last fsync
    unsynced: u64,
}

impl LogWriter {
    /// Open an existing file for writing without truncating it
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self {
            file,
            sync_strategy,
            unsynced: 0,
        })
    }

    /// Seek to `offset` and write all of `buf` in one call.
    ///
    /// Never syncs; callers follow up with `sync_after_write`.
    pub fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        self.unsynced += 1;
        Ok(())
    }

    /// Sync now if the strategy asks for a sync after every write
    pub fn sync_after_write(&mut self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync(),
            SyncStrategy::OnFlush => Ok(()),
        }
    }

    /// Read exactly `buf.len()` bytes at `offset`
    pub fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Cut the file down to `len` bytes
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        self.file.set_len(len)?;
        self.unsynced += 1;
        Ok(())
    }

    /// Flush buffered state to durable storage
    pub fn sync(&mut self) -> Result<()> {
        if self.unsynced == 0 {
            return Ok(());
        }
        self.file.flush()?;
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Current file size
    pub fn file_len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}
