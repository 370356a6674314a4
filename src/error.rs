//! Error types for slotkv
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SlotError
pub type Result<T> = std::result::Result<T, SlotError>;

/// Unified error type for slotkv operations
#[derive(Debug, Error)]
pub enum SlotError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // On-disk Format Errors
    // -------------------------------------------------------------------------
    /// Bad magic, unsupported version, or a slot header that does not fit the file
    #[error("Format error: {0}")]
    Format(String),

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid in the store's current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Key space exhausted")]
    KeySpaceExhausted,
}

impl SlotError {
    /// Prefix a format error with the file it was raised for.
    pub(crate) fn in_file(self, path: &std::path::Path) -> Self {
        match self {
            SlotError::Format(msg) => SlotError::Format(format!(
                "error while reading store from '{}': {}",
                path.display(),
                msg
            )),
            other => other,
        }
    }
}
