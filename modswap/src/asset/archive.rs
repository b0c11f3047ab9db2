//! Asset archive format and mounting.
//!
//! # Archive Layout
//!
//! ```text
//! ┌──────────┬──────────┬────────────┬──────────────────┬────────────────┐
//! │ "MSAR"   │ version  │ index_len  │ index (JSON)     │ payload blob   │
//! │ 4 bytes  │ u32 LE   │ u32 LE     │ index_len bytes  │ ...            │
//! └──────────┴──────────┴────────────┴──────────────────┴────────────────┘
//! ```
//!
//! The index is a JSON array of `{name, kind, offset, length}` where `offset`
//! is relative to the start of the payload blob. A payload that starts with
//! the gzip magic is decompressed on extraction.
//!
//! # Mount Lifetime
//!
//! Mounting reads only the header and index. The returned reader keeps the
//! archive file open and holds a [`MountHandle`]; dropping the reader closes
//! the file and releases the handle. Because release is tied to `Drop`, it
//! runs on every exit path, including a load future that is cancelled between
//! mount and extraction.

use std::future::Future;
use std::io::{ErrorKind, Read, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, trace};

use super::error::LoadError;
use super::kind::{AssetData, AssetKind, ExtractedAsset};

/// Archive magic bytes.
pub const ARCHIVE_MAGIC: &[u8; 4] = b"MSAR";

/// Current archive format version.
pub const ARCHIVE_VERSION: u32 = 1;

/// Size of the fixed header preceding the index.
const HEADER_LEN: u64 = 12;

/// Upper bound on the index size accepted at mount time.
const MAX_INDEX_LEN: u32 = 16 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One entry of an archive index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Asset name.
    pub name: String,
    /// Kind tag, see [`AssetKind::from_tag`].
    pub kind: String,
    /// Offset of the payload from the start of the blob.
    pub offset: u64,
    /// Payload length in bytes.
    pub length: u64,
}

/// Counts archives that are currently mounted.
///
/// Shared between a mounter and every [`MountHandle`] it hands out.
#[derive(Debug, Clone, Default)]
pub struct MountTracker {
    live: Arc<AtomicUsize>,
}

impl MountTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Register a newly mounted archive.
    pub fn acquire(&self, path: &Path) -> MountHandle {
        self.live.fetch_add(1, Ordering::AcqRel);
        trace!(path = %path.display(), "Archive handle acquired");
        MountHandle {
            live: Arc::clone(&self.live),
            path: path.to_path_buf(),
        }
    }
}

/// Proof that an archive is mounted. Releases the mount when dropped.
#[derive(Debug)]
pub struct MountHandle {
    live: Arc<AtomicUsize>,
    path: PathBuf,
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
        debug!(path = %self.path.display(), "Archive released");
    }
}

/// A mounted archive from which named assets can be extracted.
pub trait ArchiveReader: Send {
    /// Path the archive was mounted from.
    fn path(&self) -> &Path;

    /// Extract one asset by name.
    fn extract<'a>(&'a mut self, asset: &'a str) -> BoxFuture<'a, Result<ExtractedAsset, LoadError>>;
}

/// Opens archives for extraction.
///
/// Implementations must not share a reader between loads: every call to
/// [`mount`](Self::mount) yields an independent handle.
pub trait ArchiveMounter: Send + Sync {
    /// Mount the archive at `path`.
    fn mount<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Box<dyn ArchiveReader>, LoadError>>;

    /// Number of archives mounted through this mounter and not yet released.
    fn live_mounts(&self) -> usize;
}

/// Mounts archives from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FileArchiveMounter {
    tracker: MountTracker,
}

impl FileArchiveMounter {
    pub fn new() -> Self {
        Self::default()
    }

    async fn mount_file(&self, path: &Path) -> Result<FileArchive, LoadError> {
        let mount_failed = |reason: String| LoadError::ArchiveMountFailed {
            path: path.to_path_buf(),
            reason,
        };

        let mut file = File::open(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => LoadError::ArchiveNotFound(path.to_path_buf()),
            _ => mount_failed(e.to_string()),
        })?;

        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header)
            .await
            .map_err(|e| mount_failed(format!("truncated header: {}", e)))?;

        if &header[0..4] != ARCHIVE_MAGIC {
            return Err(mount_failed("not an asset archive".to_string()));
        }

        let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
        if version != ARCHIVE_VERSION {
            return Err(mount_failed(format!(
                "unsupported archive version {}",
                version
            )));
        }

        let index_len = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
        if index_len > MAX_INDEX_LEN {
            return Err(mount_failed(format!("index too large: {} bytes", index_len)));
        }

        let mut index_bytes = vec![0u8; index_len as usize];
        file.read_exact(&mut index_bytes)
            .await
            .map_err(|e| mount_failed(format!("truncated index: {}", e)))?;

        let index: Vec<IndexEntry> = serde_json::from_slice(&index_bytes)
            .map_err(|e| mount_failed(format!("corrupt index: {}", e)))?;

        let len = file
            .metadata()
            .await
            .map_err(|e| mount_failed(e.to_string()))?
            .len();

        let handle = self.tracker.acquire(path);
        debug!(path = %path.display(), entries = index.len(), "Archive mounted");

        Ok(FileArchive {
            path: path.to_path_buf(),
            file,
            index,
            blob_start: HEADER_LEN + index_len as u64,
            len,
            _handle: handle,
        })
    }
}

impl ArchiveMounter for FileArchiveMounter {
    fn mount<'a>(&'a self, path: &'a Path) -> BoxFuture<'a, Result<Box<dyn ArchiveReader>, LoadError>> {
        Box::pin(async move {
            let archive = self.mount_file(path).await?;
            Ok(Box::new(archive) as Box<dyn ArchiveReader>)
        })
    }

    fn live_mounts(&self) -> usize {
        self.tracker.live()
    }
}

/// An archive file mounted by [`FileArchiveMounter`].
#[derive(Debug)]
struct FileArchive {
    path: PathBuf,
    file: File,
    index: Vec<IndexEntry>,
    blob_start: u64,
    /// File size at mount time. Index entries must lie within it.
    len: u64,
    _handle: MountHandle,
}

impl FileArchive {
    async fn read_entry(&mut self, asset: &str) -> Result<ExtractedAsset, LoadError> {
        let entry = self
            .index
            .iter()
            .find(|e| e.name == asset)
            .cloned()
            .ok_or_else(|| LoadError::AssetNotFoundInArchive {
                archive: self.path.clone(),
                asset: asset.to_string(),
            })?;

        let kind = AssetKind::from_tag(&entry.kind).ok_or_else(|| {
            LoadError::AssetKindUnsupported {
                asset: entry.name.clone(),
                tag: entry.kind.clone(),
            }
        })?;

        let extraction_failed = |reason: String| LoadError::ExtractionFailed {
            asset: entry.name.clone(),
            reason,
        };

        let start = self.blob_start.checked_add(entry.offset);
        let end = start.and_then(|start| start.checked_add(entry.length));
        let start = match (start, end) {
            (Some(start), Some(end)) if end <= self.len => start,
            _ => {
                return Err(extraction_failed(format!(
                    "entry at offset {} with length {} exceeds archive size {}",
                    entry.offset, entry.length, self.len
                )))
            }
        };

        let length = usize::try_from(entry.length)
            .map_err(|_| extraction_failed(format!("payload too large: {} bytes", entry.length)))?;

        self.file
            .seek(SeekFrom::Start(start))
            .await
            .map_err(|e| extraction_failed(e.to_string()))?;

        let mut payload = vec![0u8; length];
        self.file
            .read_exact(&mut payload)
            .await
            .map_err(|e| extraction_failed(format!("truncated payload: {}", e)))?;

        let bytes = if payload.starts_with(&GZIP_MAGIC) {
            tokio::task::spawn_blocking(move || decompress(&payload))
                .await
                .map_err(|e| extraction_failed(e.to_string()))?
                .map_err(|e| extraction_failed(format!("gzip: {}", e)))?
        } else {
            payload
        };

        trace!(asset = %entry.name, kind = %kind, bytes = bytes.len(), "Asset extracted");

        Ok(ExtractedAsset::new(
            kind,
            AssetData::new(entry.name, Bytes::from(bytes)),
        ))
    }
}

impl ArchiveReader for FileArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn extract<'a>(&'a mut self, asset: &'a str) -> BoxFuture<'a, Result<ExtractedAsset, LoadError>> {
        Box::pin(self.read_entry(asset))
    }
}

fn decompress(payload: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(payload);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Builds archives in the on-disk format.
///
/// # Example
///
/// ```
/// use modswap::asset::ArchiveBuilder;
///
/// let bytes = ArchiveBuilder::new()
///     .entry("stone_albedo", "Texture", b"pixels".to_vec())
///     .build()?;
///
/// assert_eq!(&bytes[0..4], b"MSAR");
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    index: Vec<IndexEntry>,
    blob: Vec<u8>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry with an arbitrary kind tag.
    pub fn entry(mut self, name: impl Into<String>, kind: impl Into<String>, payload: Vec<u8>) -> Self {
        self.index.push(IndexEntry {
            name: name.into(),
            kind: kind.into(),
            offset: self.blob.len() as u64,
            length: payload.len() as u64,
        });
        self.blob.extend_from_slice(&payload);
        self
    }

    /// Append a gzip-compressed entry.
    pub fn compressed_entry(
        self,
        name: impl Into<String>,
        kind: impl Into<String>,
        payload: &[u8],
    ) -> std::io::Result<Self> {
        use flate2::write::GzEncoder;
        use flate2::Compression;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload)?;
        let compressed = encoder.finish()?;
        Ok(self.entry(name, kind, compressed))
    }

    /// Serialize the archive.
    pub fn build(self) -> std::io::Result<Vec<u8>> {
        let index = serde_json::to_vec(&self.index).map_err(std::io::Error::other)?;
        let index_len = u32::try_from(index.len()).map_err(|_| {
            std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("index too large: {} bytes", index.len()),
            )
        })?;

        let mut out = Vec::with_capacity(HEADER_LEN as usize + index.len() + self.blob.len());
        out.extend_from_slice(ARCHIVE_MAGIC);
        out.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
        out.extend_from_slice(&index_len.to_le_bytes());
        out.extend_from_slice(&index);
        out.extend_from_slice(&self.blob);
        Ok(out)
    }

    /// Serialize the archive to a file, creating parent directories.
    pub fn write_to(self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.build()?)
    }
}
