//! Asynchronous asset loading for bound packages.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::archive::{ArchiveMounter, FileArchiveMounter};
use super::error::{LoadError, LoadStage};
use super::kind::ExtractedAsset;
use crate::package::PackageDescriptor;

/// Default subdirectory of a package holding its archive.
pub const DEFAULT_ARCHIVE_SUBDIR: &str = "Bundle";

/// Default timeout applied to each load stage.
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Composes the archive path for a package.
///
/// `<packages_dir>/<archive_name>/<archive_subdir>/<archive_name lowercased>`
#[derive(Debug, Clone)]
pub struct ArchiveLocator {
    packages_dir: PathBuf,
    archive_subdir: String,
}

impl ArchiveLocator {
    pub fn new(packages_dir: impl Into<PathBuf>) -> Self {
        Self {
            packages_dir: packages_dir.into(),
            archive_subdir: DEFAULT_ARCHIVE_SUBDIR.to_string(),
        }
    }

    /// Use a different archive subdirectory (builder pattern).
    pub fn with_archive_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.archive_subdir = subdir.into();
        self
    }

    pub fn packages_dir(&self) -> &Path {
        &self.packages_dir
    }

    /// Archive path for `descriptor`.
    pub fn locate(&self, descriptor: &PackageDescriptor) -> PathBuf {
        self.packages_dir
            .join(&descriptor.archive_name)
            .join(&self.archive_subdir)
            .join(descriptor.archive_name.to_lowercase())
    }
}

/// Loads the single named asset of a package from its archive.
///
/// Each call mounts its own archive handle, so concurrent loads never share
/// a reader. The handle is released before the call returns, whether
/// extraction succeeded or not.
///
/// # Example
///
/// ```ignore
/// use modswap::asset::{ArchiveLocator, AssetLoader};
///
/// let loader = AssetLoader::new(ArchiveLocator::new("/game/AssetBundles"));
/// let asset = loader.load_asset(&descriptor).await?;
/// println!("loaded {} ({})", asset.name(), asset.kind());
/// ```
#[derive(Clone)]
pub struct AssetLoader {
    locator: ArchiveLocator,
    mounter: Arc<dyn ArchiveMounter>,
    timeout: Duration,
}

impl AssetLoader {
    /// Create a loader that mounts archives from the filesystem.
    pub fn new(locator: ArchiveLocator) -> Self {
        Self::with_mounter(locator, Arc::new(FileArchiveMounter::new()))
    }

    /// Create a loader with a custom mounter.
    pub fn with_mounter(locator: ArchiveLocator, mounter: Arc<dyn ArchiveMounter>) -> Self {
        Self {
            locator,
            mounter,
            timeout: DEFAULT_LOAD_TIMEOUT,
        }
    }

    /// Set the per-stage timeout (builder pattern).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn locator(&self) -> &ArchiveLocator {
        &self.locator
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of archives currently mounted by this loader.
    pub fn live_mounts(&self) -> usize {
        self.mounter.live_mounts()
    }

    /// Load the asset named by `descriptor.asset_name`.
    ///
    /// Suspends twice: once to mount the archive and once to extract the
    /// asset. Each stage is bounded by the configured timeout.
    pub async fn load_asset(&self, descriptor: &PackageDescriptor) -> Result<ExtractedAsset, LoadError> {
        let path = self.locator.locate(descriptor);

        debug!(
            package = %descriptor,
            archive = %path.display(),
            asset = %descriptor.asset_name,
            "Loading asset"
        );

        let mut reader = tokio::time::timeout(self.timeout, self.mounter.mount(&path))
            .await
            .map_err(|_| LoadError::Timeout {
                stage: LoadStage::Mount,
                after: self.timeout,
            })??;

        let extracted = tokio::time::timeout(self.timeout, reader.extract(&descriptor.asset_name))
            .await
            .map_err(|_| LoadError::Timeout {
                stage: LoadStage::Extract,
                after: self.timeout,
            });

        drop(reader);

        extracted?
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("locator", &self.locator)
            .field("timeout", &self.timeout)
            .field("live_mounts", &self.mounter.live_mounts())
            .finish()
    }
}
