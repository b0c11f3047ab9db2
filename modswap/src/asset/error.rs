//! Error types for archive loading and asset extraction.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Stage of an asset load, for timeout reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Mount,
    Extract,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mount => f.write_str("archive mount"),
            Self::Extract => f.write_str("asset extraction"),
        }
    }
}

/// Per-asset load failures.
///
/// These are isolated to the binding being applied; they never abort other
/// loads.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No archive file at the composed path.
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The archive exists but could not be opened or its index is corrupt.
    #[error("failed to mount archive {}: {reason}", .path.display())]
    ArchiveMountFailed { path: PathBuf, reason: String },

    /// The archive has no entry with the requested name.
    #[error("asset '{asset}' not found in archive {}", .archive.display())]
    AssetNotFoundInArchive { archive: PathBuf, asset: String },

    /// The entry's kind tag is outside the supported set.
    #[error("asset '{asset}' has unsupported kind '{tag}'")]
    AssetKindUnsupported { asset: String, tag: String },

    /// The entry exists but its payload could not be read or decoded.
    #[error("failed to extract asset '{asset}': {reason}")]
    ExtractionFailed { asset: String, reason: String },

    /// A load stage did not finish in time.
    #[error("{stage} timed out after {}ms", .after.as_millis())]
    Timeout { stage: LoadStage, after: Duration },
}

impl LoadError {
    /// Whether this failure is reported as a warning rather than an error.
    ///
    /// An unsupported kind only means this one asset is unusable; the
    /// archive itself was fine.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::AssetKindUnsupported { .. })
    }
}
