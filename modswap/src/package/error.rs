//! Error types for package discovery.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a discovery pass.
///
/// Any of these fails the whole pass: a partial package list is never
/// returned.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A package directory holds more than one manifest file.
    #[error("package directory {} contains {count} manifest files, expected one", .directory.display())]
    MultipleManifests { directory: PathBuf, count: usize },

    /// A manifest could not be parsed or is missing required fields.
    #[error("invalid manifest {}: {cause}", .path.display())]
    ManifestInvalid { path: PathBuf, cause: String },

    /// Failed to read a directory or manifest file.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to create the packages root.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// The manifest search pattern could not be built.
    #[error("invalid manifest pattern: {0}")]
    InvalidPattern(String),
}
