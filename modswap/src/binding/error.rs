//! Error types for binding persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reading or writing the bindings file.
///
/// A missing file is not an error; it loads as an empty registry.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read bindings file {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    #[error("failed to write bindings file {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// The file exists but its content is not a valid bindings document.
    #[error("malformed bindings file {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    /// A binding could not be encoded.
    #[error("failed to serialize bindings: {0}")]
    Serialize(#[from] serde_json::Error),
}
