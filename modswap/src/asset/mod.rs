//! Asset archives and asynchronous asset loading.
//!
//! # Load Flow
//!
//! ```text
//! PackageDescriptor
//!        │  ArchiveLocator::locate
//!        ▼
//! <packages>/<Archive>/Bundle/<archive>
//!        │  ArchiveMounter::mount        (suspension point 1)
//!        ▼
//! Box<dyn ArchiveReader> ── holds MountHandle
//!        │  ArchiveReader::extract       (suspension point 2)
//!        ▼
//! ExtractedAsset ── reader dropped, archive released
//! ```

mod archive;
mod error;
mod kind;
mod loader;

pub use archive::{
    ArchiveBuilder, ArchiveMounter, ArchiveReader, BoxFuture, FileArchiveMounter, IndexEntry,
    MountHandle, MountTracker, ARCHIVE_MAGIC, ARCHIVE_VERSION,
};
pub use error::{LoadError, LoadStage};
pub use kind::{AssetData, AssetKind, ExtractedAsset};
pub use loader::{ArchiveLocator, AssetLoader, DEFAULT_ARCHIVE_SUBDIR, DEFAULT_LOAD_TIMEOUT};
