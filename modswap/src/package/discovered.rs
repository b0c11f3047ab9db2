//! Discovered package with its on-disk location.
//!
//! [`DiscoveredPackage`] extends [`PackageDescriptor`] with the package
//! directory it was read from, using composition.

use std::ops::Deref;
use std::path::{Path, PathBuf};

use super::descriptor::PackageDescriptor;

/// A package found during a discovery pass.
///
/// The [`Deref`] implementation gives transparent access to the descriptor
/// fields, so `package.name` works as well as `package.descriptor.name`.
///
/// # Example
///
/// ```
/// use modswap::package::{DiscoveredPackage, PackageDescriptor};
///
/// let descriptor = PackageDescriptor::new("Dragon", "1.0", "2022.3", "dragon", "Dragon");
/// let package = DiscoveredPackage::new(descriptor, "/mods/AssetBundles/Dragon");
///
/// assert_eq!(package.name, "Dragon");
/// assert_eq!(package.directory_name(), "Dragon");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredPackage {
    /// Parsed manifest.
    pub descriptor: PackageDescriptor,

    /// Package directory containing the manifest.
    pub directory: PathBuf,
}

impl DiscoveredPackage {
    /// Pair a descriptor with the directory it was discovered in.
    pub fn new(descriptor: PackageDescriptor, directory: impl Into<PathBuf>) -> Self {
        Self {
            descriptor,
            directory: directory.into(),
        }
    }

    /// Path to the package directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Final component of the package directory path.
    pub fn directory_name(&self) -> String {
        self.directory
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

impl Deref for DiscoveredPackage {
    type Target = PackageDescriptor;

    fn deref(&self) -> &Self::Target {
        &self.descriptor
    }
}

impl From<DiscoveredPackage> for PackageDescriptor {
    fn from(package: DiscoveredPackage) -> Self {
        package.descriptor
    }
}

impl AsRef<PackageDescriptor> for DiscoveredPackage {
    fn as_ref(&self) -> &PackageDescriptor {
        &self.descriptor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dragon() -> PackageDescriptor {
        PackageDescriptor::new("Dragon", "1.0", "2022.3", "dragon", "Dragon")
    }

    #[test]
    fn test_discovered_package_deref() {
        let package = DiscoveredPackage::new(dragon(), "/mods/Dragon");

        assert_eq!(package.asset_name, "dragon");
        assert!(package.targets("2022.3"));
    }

    #[test]
    fn test_discovered_package_into_descriptor() {
        let package = DiscoveredPackage::new(dragon(), "/mods/Dragon");
        let descriptor: PackageDescriptor = package.into();

        assert_eq!(descriptor, dragon());
    }

    #[test]
    fn test_directory_name() {
        let package = DiscoveredPackage::new(dragon(), "/mods/AssetBundles/DragonPack");
        assert_eq!(package.directory(), Path::new("/mods/AssetBundles/DragonPack"));
        assert_eq!(package.directory_name(), "DragonPack");
    }
}
