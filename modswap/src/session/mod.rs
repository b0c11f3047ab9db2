//! Composition root and the operations a host UI drives.
//!
//! [`ModSession`] owns one of each pipeline component and wires them
//! together. Nothing in the crate is reachable globally; a host creates a
//! session and passes it where it is needed.
//!
//! # Session Flow
//!
//! ```text
//! ModSession::open ──► PackageStore::discover_packages ──► compat::evaluate
//!        │
//!        │ host UI: list_compatible_packages / bind_asset_to_target / unbind_target
//!        ▼
//! commit_bindings ──► BindingStore::save
//!
//! next run:
//! apply_all_bindings ──► BindingStore::load (resolve by name)
//!                    ──► AssetLoader::load_asset   (concurrent, bounded)
//!                    ──► ReplacementEngine::apply  (sequential, binding order)
//! ```

mod report;

pub use report::{AppliedBinding, ApplyReport, FailedBinding};

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{error, info, warn};

use crate::asset::{ArchiveMounter, AssetLoader, ExtractedAsset, FileArchiveMounter, LoadError};
use crate::binding::{Binding, BindingRegistry, BindingStore, TargetIdentity};
use crate::compat::{self, CompatibilitySet, CompatibilityStatus, PackageListing};
use crate::config::ModsConfig;
use crate::error::{ModError, ModResult};
use crate::package::{DiscoveredPackage, PackageDescriptor, PackageStore};
use crate::replace::{Replacement, ReplacementEngine};
use crate::scene::{ObjectId, Scene};

/// A mod pipeline session.
///
/// # Example
///
/// ```ignore
/// use modswap::{ModSession, ModsConfig};
///
/// let mut session = ModSession::open(ModsConfig::new("/game", "2022.3"))?;
/// for package in session.list_compatible_packages() {
///     println!("{}", package);
/// }
///
/// let report = session.apply_all_bindings(&mut scene).await?;
/// println!("{}", report);
/// ```
pub struct ModSession {
    config: ModsConfig,
    store: PackageStore,
    packages: Vec<DiscoveredPackage>,
    descriptors: Vec<PackageDescriptor>,
    compatibility: CompatibilitySet,
    loader: AssetLoader,
    engine: ReplacementEngine,
    registry: BindingRegistry,
    bindings: BindingStore,
}

impl ModSession {
    /// Create a session that reads archives from the filesystem, and run a
    /// first discovery pass.
    pub fn open(config: ModsConfig) -> ModResult<Self> {
        Self::open_with_mounter(config, Arc::new(FileArchiveMounter::new()))
    }

    /// Create a session with a custom archive mounter.
    pub fn open_with_mounter(config: ModsConfig, mounter: Arc<dyn ArchiveMounter>) -> ModResult<Self> {
        let store = PackageStore::new(config.packages_dir())
            .with_manifest_extension(config.manifest_extension.clone());
        let loader = AssetLoader::with_mounter(config.archive_locator(), mounter)
            .with_timeout(config.load_timeout);
        let bindings = BindingStore::new(config.bindings_path());

        info!(
            packages_dir = %config.packages_dir().display(),
            bindings = %bindings.path().display(),
            host_version = %config.host_version,
            "Opening mod session"
        );

        let mut session = Self {
            config,
            store,
            packages: Vec::new(),
            descriptors: Vec::new(),
            compatibility: CompatibilitySet::default(),
            loader,
            engine: ReplacementEngine::new(),
            registry: BindingRegistry::new(),
            bindings,
        };
        session.refresh()?;
        Ok(session)
    }

    /// Run a new discovery pass and re-evaluate compatibility.
    ///
    /// On failure no packages are listed until the next successful pass.
    pub fn refresh(&mut self) -> ModResult<()> {
        self.packages.clear();
        self.descriptors.clear();
        self.compatibility = CompatibilitySet::default();

        let packages = self.store.discover_packages()?;
        let descriptors: Vec<PackageDescriptor> =
            packages.iter().map(|p| p.descriptor.clone()).collect();
        let compatibility = compat::evaluate(&descriptors, &self.config.host_version);

        info!(
            compatible = compatibility.compatible().len(),
            incompatible = compatibility.incompatible().len(),
            host_version = %self.config.host_version,
            "Evaluated package compatibility"
        );

        self.packages = packages;
        self.descriptors = descriptors;
        self.compatibility = compatibility;
        Ok(())
    }

    pub fn config(&self) -> &ModsConfig {
        &self.config
    }

    /// Packages found by the last discovery pass, with their directories.
    pub fn packages(&self) -> &[DiscoveredPackage] {
        &self.packages
    }

    pub fn compatibility(&self) -> &CompatibilitySet {
        &self.compatibility
    }

    pub fn list_compatible_packages(&self) -> Vec<&PackageDescriptor> {
        self.compatibility.compatible_in(&self.descriptors).collect()
    }

    pub fn list_incompatible_packages(&self) -> Vec<&PackageDescriptor> {
        self.compatibility
            .incompatible_in(&self.descriptors)
            .collect()
    }

    /// All packages with their status, compatible first.
    pub fn listings(&self) -> Vec<PackageListing> {
        compat::listings(&self.descriptors, &self.compatibility)
    }

    /// In-memory bindings for this session.
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    /// Archives currently mounted by in-flight loads.
    pub fn live_mounts(&self) -> usize {
        self.loader.live_mounts()
    }

    /// Bind `descriptor` to `target` under `identity`.
    ///
    /// Only compatible discovered packages can be bound. Returns the binding
    /// this one replaced, whose side effects the caller should retire.
    pub fn bind_asset_to_target(
        &mut self,
        identity: impl Into<TargetIdentity>,
        descriptor: &PackageDescriptor,
        target: ObjectId,
    ) -> ModResult<Option<Binding>> {
        let index = self
            .descriptors
            .iter()
            .position(|d| d == descriptor)
            .ok_or_else(|| ModError::PackageNotListed {
                package: descriptor.to_string(),
            })?;

        if self.compatibility.status_of(index) != Some(CompatibilityStatus::Compatible) {
            return Err(ModError::PackageIncompatible {
                package: descriptor.to_string(),
                target_version: descriptor.target_platform_version.clone(),
                host_version: self.config.host_version.clone(),
            });
        }

        Ok(self.registry.bind(identity, descriptor.clone(), target))
    }

    pub fn unbind_target(&mut self, identity: &str) -> Option<Binding> {
        self.registry.unbind(identity)
    }

    /// Save the in-memory bindings with transform snapshots from `scene`.
    pub fn commit_bindings(&self, scene: &Scene) -> ModResult<()> {
        self.bindings.save(&self.registry, scene)?;
        Ok(())
    }

    /// Load the saved bindings against `scene` and apply each one.
    ///
    /// The loaded bindings replace the in-memory registry. Asset loads run
    /// concurrently up to the configured limit; replacements then run one at
    /// a time in binding order. A failed binding is logged and reported, and
    /// never stops the others.
    pub async fn apply_all_bindings(&mut self, scene: &mut Scene) -> ModResult<ApplyReport> {
        let loaded = self.bindings.load(scene)?;
        let mut report = ApplyReport {
            dropped: loaded.dropped().to_vec(),
            ..Default::default()
        };
        self.registry = loaded.into_registry();

        let bindings: Vec<Binding> = self.registry.all_bindings().cloned().collect();
        let assets = self.load_assets(&bindings).await;

        for (binding, result) in bindings.into_iter().zip(assets) {
            let asset = match result {
                Ok(asset) => asset,
                Err(e) => {
                    if e.is_warning() {
                        warn!(
                            identity = %binding.identity,
                            package = %binding.descriptor,
                            error = %e,
                            "Skipping binding"
                        );
                    } else {
                        error!(
                            identity = %binding.identity,
                            package = %binding.descriptor,
                            error = %e,
                            "Asset load failed"
                        );
                    }
                    report.failed.push(FailedBinding {
                        identity: binding.identity,
                        package: binding.descriptor,
                        error: e.into(),
                    });
                    continue;
                }
            };

            match self.engine.apply(scene, asset, binding.target) {
                Ok(replacement) => {
                    if let Replacement::Respawned { spawned, .. } = replacement {
                        // Keep the session binding on the live object; the
                        // saved name will no longer resolve.
                        self.registry
                            .bind(binding.identity.clone(), binding.descriptor.clone(), spawned);
                    }
                    report.applied.push(AppliedBinding {
                        identity: binding.identity,
                        package: binding.descriptor,
                        replacement,
                    });
                }
                Err(e) => {
                    error!(
                        identity = %binding.identity,
                        package = %binding.descriptor,
                        error = %e,
                        "Replacement failed"
                    );
                    report.failed.push(FailedBinding {
                        identity: binding.identity,
                        package: binding.descriptor,
                        error: e.into(),
                    });
                }
            }
        }

        info!(
            applied = report.applied.len(),
            failed = report.failed.len(),
            dropped = report.dropped.len(),
            "Applied bindings"
        );

        Ok(report)
    }

    /// Load every binding's asset, returning results in binding order.
    async fn load_assets(&self, bindings: &[Binding]) -> Vec<Result<ExtractedAsset, LoadError>> {
        let loader = &self.loader;

        let mut results: Vec<(usize, Result<ExtractedAsset, LoadError>)> =
            stream::iter(bindings.iter().enumerate())
                .map(|(index, binding)| async move {
                    (index, loader.load_asset(&binding.descriptor).await)
                })
                .buffer_unordered(self.config.max_concurrent_loads.max(1))
                .collect()
                .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

impl std::fmt::Debug for ModSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModSession")
            .field("config", &self.config)
            .field("packages", &self.packages.len())
            .field("bindings", &self.registry.len())
            .field("loader", &self.loader)
            .finish()
    }
}
