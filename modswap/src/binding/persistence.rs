//! Durable storage of the binding registry.
//!
//! The file holds three parallel sequences indexed positionally:
//!
//! ```json
//! {
//!   "Keys": ["Rock_01"],
//!   "ModPackages": ["{\"Name\":\"StoneSkin\",...}"],
//!   "GameObjects": [{"Name": "Rock_01", "Position": {...}, "Rotation": {...}, "Scale": {...}}]
//! }
//! ```
//!
//! Live object handles are not stored. On load each key is resolved again by
//! name against the scene current at that time.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::error::PersistenceError;
use super::identity::TargetIdentity;
use super::registry::BindingRegistry;
use crate::package::PackageDescriptor;
use crate::scene::{Scene, Transform};

/// Transform of a bound target captured at save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSnapshot {
    pub name: String,
    #[serde(flatten)]
    pub transform: Transform,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct BindingFile {
    keys: Vec<String>,
    mod_packages: Vec<String>,
    game_objects: Vec<ObjectSnapshot>,
}

/// Result of loading the bindings file against a scene.
#[derive(Debug, Default)]
pub struct LoadedBindings {
    registry: BindingRegistry,
    snapshots: BTreeMap<TargetIdentity, ObjectSnapshot>,
    dropped: Vec<TargetIdentity>,
}

impl LoadedBindings {
    /// Bindings whose targets were found in the scene.
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    pub fn into_registry(self) -> BindingRegistry {
        self.registry
    }

    /// Saved transform for `identity`, including dropped ones.
    pub fn snapshot(&self, identity: &str) -> Option<&ObjectSnapshot> {
        self.snapshots.get(identity)
    }

    /// Identities with no matching object in the scene.
    pub fn dropped(&self) -> &[TargetIdentity] {
        &self.dropped
    }
}

/// Reads and writes the bindings file.
#[derive(Debug, Clone)]
pub struct BindingStore {
    path: PathBuf,
}

impl BindingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write every binding with a snapshot of its target's transform.
    ///
    /// A target that is no longer in the scene is saved with an identity
    /// transform; the binding itself is kept.
    pub fn save(&self, registry: &BindingRegistry, scene: &Scene) -> Result<(), PersistenceError> {
        let mut file = BindingFile::default();

        for binding in registry.all_bindings() {
            let transform = match scene.get(binding.target) {
                Some(object) => object.transform,
                None => {
                    warn!(
                        identity = %binding.identity,
                        "Bound object no longer in scene, saving identity transform"
                    );
                    Transform::IDENTITY
                }
            };

            file.keys.push(binding.identity.to_string());
            file.mod_packages.push(binding.descriptor.to_json()?);
            file.game_objects.push(ObjectSnapshot {
                name: binding.identity.to_string(),
                transform,
            });
        }

        let json = serde_json::to_string_pretty(&file)?;
        self.write_atomic(json.as_bytes())?;

        info!(
            path = %self.path.display(),
            bindings = file.keys.len(),
            "Saved bindings"
        );

        Ok(())
    }

    /// Load bindings, resolving each identity by name in `scene`.
    ///
    /// A missing file yields no bindings. Identities with no matching object
    /// are dropped without error and listed in [`LoadedBindings::dropped`].
    pub fn load(&self, scene: &Scene) -> Result<LoadedBindings, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No bindings file");
                return Ok(LoadedBindings::default());
            }
            Err(source) => {
                return Err(PersistenceError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let file: BindingFile =
            serde_json::from_str(&content).map_err(|e| self.malformed(e.to_string()))?;

        if file.keys.len() != file.mod_packages.len() || file.keys.len() != file.game_objects.len() {
            return Err(self.malformed(format!(
                "sequence lengths differ: {} keys, {} packages, {} objects",
                file.keys.len(),
                file.mod_packages.len(),
                file.game_objects.len()
            )));
        }

        let mut loaded = LoadedBindings::default();
        let entries = file
            .keys
            .into_iter()
            .zip(file.mod_packages)
            .zip(file.game_objects);

        for ((key, package), snapshot) in entries {
            let descriptor = PackageDescriptor::from_json(&package)
                .map_err(|e| self.malformed(format!("package for '{}': {}", key, e)))?;
            let identity = TargetIdentity::new(key);

            match scene.find_by_name(identity.as_str()) {
                Some(target) => {
                    loaded.registry.bind(identity.clone(), descriptor, target);
                }
                None => {
                    debug!(identity = %identity, "Bound object not in scene, dropping binding");
                    loaded.dropped.push(identity.clone());
                }
            }
            loaded.snapshots.insert(identity, snapshot);
        }

        info!(
            path = %self.path.display(),
            bindings = loaded.registry.len(),
            dropped = loaded.dropped.len(),
            "Loaded bindings"
        );

        Ok(loaded)
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), PersistenceError> {
        let write_failed = |source| PersistenceError::WriteFailed {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, bytes).map_err(write_failed)?;
        fs::rename(&temp_path, &self.path).map_err(write_failed)?;

        Ok(())
    }

    fn malformed(&self, reason: String) -> PersistenceError {
        PersistenceError::Malformed {
            path: self.path.clone(),
            reason,
        }
    }
}
