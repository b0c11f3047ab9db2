//! Package descriptor parsed from a package manifest.
//!
//! The [`PackageDescriptor`] is the immutable identity of one mod package. It is
//! built once per discovered package directory and is used as a map key by the
//! binding registry, so equality and hashing are structural over every field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Immutable description of a mod package.
///
/// Manifests are JSON documents with PascalCase keys. The legacy key names
/// `UnityVersion` and `BundleName` are accepted for `TargetPlatformVersion`
/// and `ArchiveName` respectively.
///
/// # Example
///
/// ```
/// use modswap::package::PackageDescriptor;
///
/// let json = r#"{
///     "Name": "StoneSkin",
///     "Version": "1.0",
///     "TargetPlatformVersion": "2022.3",
///     "AssetName": "stone_albedo",
///     "ArchiveName": "StoneSkin"
/// }"#;
///
/// let descriptor = PackageDescriptor::from_json(json).unwrap();
/// assert_eq!(descriptor.name, "StoneSkin");
/// assert_eq!(descriptor.author, "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PackageDescriptor {
    /// Display name of the package.
    pub name: String,

    /// Free-form description shown to the user.
    #[serde(default)]
    pub description: String,

    /// Package author.
    #[serde(default)]
    pub author: String,

    /// Package version. Opaque, never parsed.
    pub version: String,

    /// Host version this package was built against.
    ///
    /// Compared for exact equality with the running host's version string.
    #[serde(alias = "UnityVersion")]
    pub target_platform_version: String,

    /// Name of the single asset to extract from the archive.
    pub asset_name: String,

    /// Locator of the backing asset archive.
    #[serde(alias = "BundleName")]
    pub archive_name: String,
}

impl PackageDescriptor {
    /// Create a descriptor with empty description and author.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        target_platform_version: impl Into<String>,
        asset_name: impl Into<String>,
        archive_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            author: String::new(),
            version: version.into(),
            target_platform_version: target_platform_version.into(),
            asset_name: asset_name.into(),
            archive_name: archive_name.into(),
        }
    }

    /// Set the description (builder pattern).
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the author (builder pattern).
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Parse a descriptor from manifest JSON and check required fields.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let descriptor: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Serialize as a self-contained JSON record.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Check that the fields the pipeline depends on are not blank.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("Name", &self.name),
            ("AssetName", &self.asset_name),
            ("ArchiveName", &self.archive_name),
        ];

        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(format!("required field '{}' is empty", field));
            }
        }

        Ok(())
    }

    /// Whether this package was built for the given host version.
    pub fn targets(&self, host_version: &str) -> bool {
        self.target_platform_version == host_version
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}
