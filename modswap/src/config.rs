//! Configuration for the mod pipeline.
//!
//! Settings can be built in code or read from an INI file:
//!
//! ```ini
//! [mods]
//! data_root = /home/player/.local/share/game
//! host_version = 2022.3
//! packages_dir = AssetBundles
//! manifest_extension = manifest
//! bindings_dir = ModDataFolder
//! bindings_file = mod_data.json
//!
//! [loader]
//! archive_subdir = Bundle
//! timeout_secs = 30
//! max_concurrent_loads = 4
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::asset::{ArchiveLocator, DEFAULT_ARCHIVE_SUBDIR, DEFAULT_LOAD_TIMEOUT};
use crate::package::{PackageDescriptor, DEFAULT_MANIFEST_EXTENSION};

/// Default name of the packages directory under the data root.
pub const DEFAULT_PACKAGES_DIR: &str = "AssetBundles";

/// Default name of the bindings directory under the data root.
pub const DEFAULT_BINDINGS_DIR: &str = "ModDataFolder";

/// Default bindings file name.
pub const DEFAULT_BINDINGS_FILE: &str = "mod_data.json";

/// Errors reading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Configuration for a mod session.
#[derive(Debug, Clone, PartialEq)]
pub struct ModsConfig {
    /// Root holding the packages and bindings directories.
    pub data_root: PathBuf,

    /// Version string of the running host, compared exactly against each
    /// package's target platform version.
    pub host_version: String,

    pub packages_dir_name: String,
    pub archive_subdir: String,
    pub manifest_extension: String,
    pub bindings_dir_name: String,
    pub bindings_file_name: String,

    /// Timeout for each archive mount and each asset extraction.
    pub load_timeout: Duration,

    /// Maximum asset loads in flight while applying bindings.
    pub max_concurrent_loads: usize,
}

impl Default for ModsConfig {
    fn default() -> Self {
        Self {
            data_root: dirs::data_dir()
                .map(|dir| dir.join("modswap"))
                .unwrap_or_else(|| PathBuf::from(".")),
            host_version: String::new(),
            packages_dir_name: DEFAULT_PACKAGES_DIR.to_string(),
            archive_subdir: DEFAULT_ARCHIVE_SUBDIR.to_string(),
            manifest_extension: DEFAULT_MANIFEST_EXTENSION.to_string(),
            bindings_dir_name: DEFAULT_BINDINGS_DIR.to_string(),
            bindings_file_name: DEFAULT_BINDINGS_FILE.to_string(),
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            max_concurrent_loads: 4,
        }
    }
}

impl ModsConfig {
    /// Create a configuration rooted at `data_root` for the given host version.
    pub fn new(data_root: impl Into<PathBuf>, host_version: impl Into<String>) -> Self {
        Self {
            data_root: data_root.into(),
            host_version: host_version.into(),
            ..Default::default()
        }
    }

    pub fn with_packages_dir_name(mut self, name: impl Into<String>) -> Self {
        self.packages_dir_name = name.into();
        self
    }

    pub fn with_archive_subdir(mut self, subdir: impl Into<String>) -> Self {
        self.archive_subdir = subdir.into();
        self
    }

    pub fn with_manifest_extension(mut self, extension: impl Into<String>) -> Self {
        self.manifest_extension = extension.into();
        self
    }

    pub fn with_bindings_file(mut self, dir_name: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.bindings_dir_name = dir_name.into();
        self.bindings_file_name = file_name.into();
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    /// Set the load concurrency limit. Zero is raised to one.
    pub fn with_max_concurrent_loads(mut self, max: usize) -> Self {
        self.max_concurrent_loads = max.max(1);
        self
    }

    /// Directory scanned for packages.
    pub fn packages_dir(&self) -> PathBuf {
        self.data_root.join(&self.packages_dir_name)
    }

    /// Path of the bindings file.
    pub fn bindings_path(&self) -> PathBuf {
        self.data_root
            .join(&self.bindings_dir_name)
            .join(&self.bindings_file_name)
    }

    /// Locator composing archive paths under the packages directory.
    pub fn archive_locator(&self) -> ArchiveLocator {
        ArchiveLocator::new(self.packages_dir()).with_archive_subdir(self.archive_subdir.clone())
    }

    /// Archive path for `descriptor`.
    pub fn archive_path(&self, descriptor: &PackageDescriptor) -> PathBuf {
        self.archive_locator().locate(descriptor)
    }

    /// Read configuration from an INI file.
    pub fn from_ini(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&content)
    }

    /// Read configuration from INI text.
    ///
    /// Missing keys keep their defaults; unknown keys are ignored.
    pub fn from_ini_str(content: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        let mut config = Self::default();

        if let Some(mods) = ini.section(Some("mods")) {
            if let Some(v) = mods.get("data_root") {
                config.data_root = PathBuf::from(v);
            }
            if let Some(v) = mods.get("host_version") {
                config.host_version = v.to_string();
            }
            if let Some(v) = mods.get("packages_dir") {
                config.packages_dir_name = v.to_string();
            }
            if let Some(v) = mods.get("manifest_extension") {
                config.manifest_extension = v.to_string();
            }
            if let Some(v) = mods.get("bindings_dir") {
                config.bindings_dir_name = v.to_string();
            }
            if let Some(v) = mods.get("bindings_file") {
                config.bindings_file_name = v.to_string();
            }
        }

        if let Some(loader) = ini.section(Some("loader")) {
            if let Some(v) = loader.get("archive_subdir") {
                config.archive_subdir = v.to_string();
            }
            if let Some(v) = loader.get("timeout_secs") {
                config.load_timeout = Duration::from_secs(parse_value("loader", "timeout_secs", v)?);
            }
            if let Some(v) = loader.get("max_concurrent_loads") {
                let max: usize = parse_value("loader", "max_concurrent_loads", v)?;
                if max == 0 {
                    return Err(ConfigError::InvalidValue {
                        section: "loader".to_string(),
                        key: "max_concurrent_loads".to_string(),
                        value: v.to_string(),
                        reason: "must be at least 1".to_string(),
                    });
                }
                config.max_concurrent_loads = max;
            }
        }

        Ok(config)
    }
}

fn parse_value<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}
