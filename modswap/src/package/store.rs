//! Package discovery from the packages directory.
//!
//! Layout scanned by [`PackageStore`]:
//!
//! ```text
//! <data_root>/AssetBundles/
//! ├── Dragon/
//! │   ├── dragon.manifest      # exactly one manifest per package
//! │   └── Bundle/
//! │       └── dragon           # backing archive (lowercased archive name)
//! └── StoneSkin/
//!     ├── stoneskin.manifest
//!     └── Bundle/
//!         └── stoneskin
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::descriptor::PackageDescriptor;
use super::discovered::DiscoveredPackage;
use super::error::DiscoveryError;

/// Default manifest file extension.
pub const DEFAULT_MANIFEST_EXTENSION: &str = "manifest";

/// Reads package manifests from a packages directory.
#[derive(Debug, Clone)]
pub struct PackageStore {
    /// Directory whose subdirectories are packages.
    packages_dir: PathBuf,

    /// Extension (without the dot) identifying manifest files.
    manifest_extension: String,
}

impl PackageStore {
    /// Create a store rooted at the given packages directory.
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            manifest_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
        }
    }

    /// Use a different manifest extension (builder pattern).
    pub fn with_manifest_extension(mut self, extension: impl Into<String>) -> Self {
        self.manifest_extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    /// Get the packages directory.
    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    /// Get the manifest extension.
    pub fn manifest_extension(&self) -> &str {
        &self.manifest_extension
    }

    /// Discover all package descriptors.
    ///
    /// See [`discover_packages`](Self::discover_packages) for the rules.
    pub fn discover(&self) -> Result<Vec<PackageDescriptor>, DiscoveryError> {
        Ok(self
            .discover_packages()?
            .into_iter()
            .map(PackageDescriptor::from)
            .collect())
    }

    /// Discover all packages with their directories.
    ///
    /// - A missing packages directory is created and yields no packages.
    /// - Subdirectories are visited in name order; hidden ones are skipped.
    /// - A directory with no manifest contributes nothing.
    /// - A directory with more than one manifest, or any unreadable or
    ///   malformed manifest, fails the whole pass.
    pub fn discover_packages(&self) -> Result<Vec<DiscoveredPackage>, DiscoveryError> {
        if !self.packages_dir.is_dir() {
            fs::create_dir_all(&self.packages_dir).map_err(|e| {
                DiscoveryError::CreateDirFailed {
                    path: self.packages_dir.clone(),
                    source: e,
                }
            })?;
            info!(path = %self.packages_dir.display(), "Created empty packages directory");
            return Ok(Vec::new());
        }

        let mut directories = Vec::new();
        let entries = fs::read_dir(&self.packages_dir).map_err(|e| DiscoveryError::ReadFailed {
            path: self.packages_dir.clone(),
            source: e,
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| DiscoveryError::ReadFailed {
                path: self.packages_dir.clone(),
                source: e,
            })?;
            let path = entry.path();

            if !path.is_dir() {
                continue;
            }

            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }

            directories.push(path);
        }

        directories.sort();

        let mut packages = Vec::with_capacity(directories.len());
        for directory in directories {
            if let Some(package) = self.read_package(&directory)? {
                packages.push(package);
            }
        }

        info!(
            path = %self.packages_dir.display(),
            packages = packages.len(),
            "Package discovery complete"
        );

        Ok(packages)
    }

    /// Read the single manifest of one package directory, if any.
    fn read_package(&self, directory: &Path) -> Result<Option<DiscoveredPackage>, DiscoveryError> {
        let manifests = self.find_manifests(directory)?;

        let manifest = match manifests.as_slice() {
            [] => {
                debug!(directory = %directory.display(), "No manifest, skipping directory");
                return Ok(None);
            }
            [single] => single,
            _ => {
                return Err(DiscoveryError::MultipleManifests {
                    directory: directory.to_path_buf(),
                    count: manifests.len(),
                })
            }
        };

        let content = fs::read_to_string(manifest).map_err(|e| DiscoveryError::ReadFailed {
            path: manifest.clone(),
            source: e,
        })?;

        let descriptor = PackageDescriptor::from_json(&content).map_err(|cause| {
            DiscoveryError::ManifestInvalid {
                path: manifest.clone(),
                cause,
            }
        })?;

        debug!(
            package = %descriptor,
            directory = %directory.display(),
            "Read package manifest"
        );

        Ok(Some(DiscoveredPackage::new(descriptor, directory)))
    }

    /// List manifest files directly inside a package directory.
    fn find_manifests(&self, directory: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        let pattern = format!(
            "{}/*.{}",
            glob::Pattern::escape(&directory.to_string_lossy()),
            glob::Pattern::escape(&self.manifest_extension)
        );

        let paths =
            glob::glob(&pattern).map_err(|e| DiscoveryError::InvalidPattern(e.to_string()))?;

        let mut manifests = Vec::new();
        for path in paths {
            let path = path.map_err(|e| DiscoveryError::ReadFailed {
                path: e.path().to_path_buf(),
                source: e.into_error(),
            })?;
            if path.is_file() {
                manifests.push(path);
            }
        }

        Ok(manifests)
    }
}
