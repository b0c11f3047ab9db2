//! Crate-level error type.

use crate::asset::LoadError;
use crate::binding::PersistenceError;
use crate::config::ConfigError;
use crate::package::DiscoveryError;
use crate::replace::ReplaceError;

/// Result type for session operations.
pub type ModResult<T> = Result<T, ModError>;

/// Errors surfaced by [`ModSession`](crate::session::ModSession) and setup.
#[derive(Debug)]
pub enum ModError {
    /// The discovery pass failed; no packages are listed.
    Discovery(DiscoveryError),

    /// An asset could not be loaded.
    Load(LoadError),

    /// An asset could not be applied to its target.
    Replace(ReplaceError),

    /// The bindings file could not be read or written.
    Persistence(PersistenceError),

    /// Configuration could not be read.
    Config(ConfigError),

    /// The diagnostic channel could not be installed.
    Logging(String),

    /// The package is not among the discovered packages.
    PackageNotListed { package: String },

    /// The package targets a different host version.
    PackageIncompatible {
        package: String,
        target_version: String,
        host_version: String,
    },
}

impl std::fmt::Display for ModError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovery(e) => write!(f, "package discovery failed: {}", e),
            Self::Load(e) => write!(f, "asset load failed: {}", e),
            Self::Replace(e) => write!(f, "replacement failed: {}", e),
            Self::Persistence(e) => write!(f, "binding persistence failed: {}", e),
            Self::Config(e) => write!(f, "configuration error: {}", e),
            Self::Logging(msg) => write!(f, "failed to initialize logging: {}", msg),
            Self::PackageNotListed { package } => {
                write!(f, "package {} is not among the discovered packages", package)
            }
            Self::PackageIncompatible {
                package,
                target_version,
                host_version,
            } => {
                write!(
                    f,
                    "package {} targets version {}, host is {}",
                    package, target_version, host_version
                )
            }
        }
    }
}

impl std::error::Error for ModError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Discovery(e) => Some(e),
            Self::Load(e) => Some(e),
            Self::Replace(e) => Some(e),
            Self::Persistence(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for ModError {
    fn from(err: DiscoveryError) -> Self {
        Self::Discovery(err)
    }
}

impl From<LoadError> for ModError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<ReplaceError> for ModError {
    fn from(err: ReplaceError) -> Self {
        Self::Replace(err)
    }
}

impl From<PersistenceError> for ModError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}

impl From<ConfigError> for ModError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
