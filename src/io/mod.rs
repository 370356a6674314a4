//! I/O Module
//!
//! The file primitives the store is built on.
//!
//! ## Responsibilities
//! - Sequential reads over a scanned file view (`LogReader`)
//! - Positioned writes and durability (`LogWriter`)
//! - Atomic replacement of one file by another (`replace_file`)

mod reader;
mod writer;

use std::fs;
use std::path::Path;

pub use reader::LogReader;
pub use writer::LogWriter;

use crate::error::Result;

/// Atomically move `src` over `dest`.
///
/// Both paths must live on the same filesystem; `dest` is replaced if it
/// exists.
pub fn replace_file(src: &Path, dest: &Path) -> Result<()> {
    fs::rename(src, dest)?;

    // Persist the rename itself on platforms where a directory can be synced.
    #[cfg(unix)]
    if let Some(dir) = dest.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::File::open(dir)?.sync_all()?;
    }

    Ok(())
}
