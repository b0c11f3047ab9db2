//! Mod package discovery.
//!
//! A package is a directory holding one manifest (metadata) and one backing
//! archive of assets. This module turns the packages directory into a list of
//! [`PackageDescriptor`]s.
//!
//! # Type Hierarchy
//!
//! ```text
//! PackageDescriptor (base)             DiscoveredPackage (composition)
//! ├── name, description, author        ├── descriptor: PackageDescriptor  ←── contains
//! ├── version                          └── directory: PathBuf
//! ├── target_platform_version
//! ├── asset_name
//! └── archive_name
//! ```
//!
//! Discovery is fail-fast: one package directory with two manifests, or one
//! unreadable manifest, aborts the whole pass.

mod descriptor;
mod discovered;
mod error;
mod store;

pub use descriptor::PackageDescriptor;
pub use discovered::DiscoveredPackage;
pub use error::DiscoveryError;
pub use store::{PackageStore, DEFAULT_MANIFEST_EXTENSION};
