//! Integration tests for the mod pipeline.
//!
//! These tests drive a `ModSession` against real package directories and
//! bindings files in a temp dir:
//! - discovery → compatibility → listings
//! - bind → commit → new session → apply
//! - per-binding failure isolation and archive release
//!
//! Run with: `cargo test --test pipeline_integration`

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use modswap::asset::{
    ArchiveBuilder, AssetKind, IndexEntry, LoadError, ARCHIVE_MAGIC, ARCHIVE_VERSION,
};
use modswap::package::{DiscoveryError, PackageDescriptor, PackageStore};
use modswap::replace::{ReplaceError, Replacement};
use modswap::scene::{Components, ObjectTemplate, Scene, Transform, Vec3};
use modswap::{ModError, ModSession, ModsConfig};

// ============================================================================
// Helper Functions
// ============================================================================

const HOST_VERSION: &str = "2022.3";

fn config(root: &Path) -> ModsConfig {
    ModsConfig::new(root, HOST_VERSION)
}

/// Write a package directory with a manifest and an archive holding the
/// descriptor's asset under `kind`.
fn write_package(root: &Path, descriptor: &PackageDescriptor, kind: &str, payload: &[u8]) {
    let config = config(root);
    let dir = config.packages_dir().join(&descriptor.archive_name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{}.manifest", descriptor.name)),
        descriptor.to_json().unwrap(),
    )
    .unwrap();
    ArchiveBuilder::new()
        .entry(descriptor.asset_name.clone(), kind, payload.to_vec())
        .write_to(&config.archive_path(descriptor))
        .unwrap();
}

/// Write a package whose archive index claims `offset` and `length` for the
/// descriptor's asset, regardless of the payload actually stored.
fn write_package_with_index(root: &Path, descriptor: &PackageDescriptor, offset: u64, length: u64) {
    let config = config(root);
    let dir = config.packages_dir().join(&descriptor.archive_name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join(format!("{}.manifest", descriptor.name)),
        descriptor.to_json().unwrap(),
    )
    .unwrap();

    let index = serde_json::to_vec(&[IndexEntry {
        name: descriptor.asset_name.clone(),
        kind: "Texture".to_string(),
        offset,
        length,
    }])
    .unwrap();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(ARCHIVE_MAGIC);
    bytes.extend_from_slice(&ARCHIVE_VERSION.to_le_bytes());
    bytes.extend_from_slice(&(index.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&index);
    bytes.extend_from_slice(b"px");

    let archive = config.archive_path(descriptor);
    fs::create_dir_all(archive.parent().unwrap()).unwrap();
    fs::write(archive, bytes).unwrap();
}

fn package(name: &str, target_version: &str, asset: &str) -> PackageDescriptor {
    PackageDescriptor::new(name, "1.0", target_version, asset, name)
}

fn stone_skin() -> PackageDescriptor {
    package("StoneSkin", HOST_VERSION, "stone_albedo").with_author("Quarry Works")
}

/// A scene with one renderable prop per name, spaced along x.
fn prop_scene(names: &[&str]) -> Scene {
    let mut scene = Scene::new();
    for (i, name) in names.iter().enumerate() {
        scene.spawn_with(
            *name,
            Transform::at(Vec3::new(i as f32 * 10.0, 0.0, 0.0)),
            Components::mesh_prop(),
            None,
        );
    }
    scene
}

fn main_texture(scene: &Scene, name: &str) -> Option<String> {
    let id = scene.find_by_name(name)?;
    let renderer = scene.get(id)?.components.renderer.as_ref()?;
    renderer.material.main_texture.as_ref().map(|t| t.name.clone())
}

// ============================================================================
// Discovery and Compatibility
// ============================================================================

#[test]
fn test_dragon_compatibility_scenario() {
    let temp = TempDir::new().unwrap();
    let current = package("Dragon", "2022.3", "dragon_mesh");
    let old = package("OldDragon", "2021.1", "dragon_mesh");
    write_package(temp.path(), &current, "Mesh", b"v");
    write_package(temp.path(), &old, "Mesh", b"v");

    let session = ModSession::open(config(temp.path())).unwrap();

    assert_eq!(session.list_compatible_packages(), vec![&current]);
    assert_eq!(session.list_incompatible_packages(), vec![&old]);

    let listings = session.listings();
    assert_eq!(listings.len(), 2);
    assert!(listings[0].is_interactable());
    assert_eq!(listings[0].status.label(), "Compatible");
    assert!(!listings[1].is_interactable());
    assert_eq!(listings[1].status.label(), "Incompatible");
}

#[test]
fn test_two_manifests_fail_the_whole_pass() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    let dragon = package("Dragon", HOST_VERSION, "dragon_mesh");
    write_package(temp.path(), &dragon, "Mesh", b"v");
    let dragon_dir = config(temp.path()).packages_dir().join("Dragon");
    fs::write(dragon_dir.join("copy.manifest"), dragon.to_json().unwrap()).unwrap();

    let store = PackageStore::new(config(temp.path()).packages_dir());
    assert!(matches!(
        store.discover(),
        Err(DiscoveryError::MultipleManifests { count: 2, .. })
    ));

    let result = ModSession::open(config(temp.path()));
    assert!(matches!(
        result,
        Err(ModError::Discovery(DiscoveryError::MultipleManifests { .. }))
    ));
}

#[test]
fn test_directory_without_manifest_is_skipped() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    fs::create_dir_all(config(temp.path()).packages_dir().join("Empty").join("Bundle")).unwrap();

    let session = ModSession::open(config(temp.path())).unwrap();

    assert_eq!(session.packages().len(), 1);
    assert_eq!(session.packages()[0].directory_name(), "StoneSkin");
}

// ============================================================================
// Binding Round Trips
// ============================================================================

#[test]
fn test_bind_then_unbind_leaves_no_entry() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    let mut session = ModSession::open(config(temp.path())).unwrap();
    let scene = prop_scene(&["Rock_01"]);
    let rock = scene.find_by_name("Rock_01").unwrap();

    session
        .bind_asset_to_target("Rock_01", &stone_skin(), rock)
        .unwrap();
    let removed = session.unbind_target("Rock_01").unwrap();

    assert_eq!(removed.descriptor, stone_skin());
    assert!(session.registry().get("Rock_01").is_none());
    assert!(session.registry().is_empty());
}

#[test]
fn test_rebinding_returns_previous_binding() {
    let temp = TempDir::new().unwrap();
    let moss = package("Moss", HOST_VERSION, "moss_albedo");
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    write_package(temp.path(), &moss, "Texture", b"px");
    let mut session = ModSession::open(config(temp.path())).unwrap();
    let scene = prop_scene(&["Rock_01"]);
    let rock = scene.find_by_name("Rock_01").unwrap();

    session
        .bind_asset_to_target("Rock_01", &stone_skin(), rock)
        .unwrap();
    let previous = session
        .bind_asset_to_target("Rock_01", &moss, rock)
        .unwrap()
        .unwrap();

    assert_eq!(previous.descriptor, stone_skin());
    assert_eq!(session.registry().len(), 1);
}

#[tokio::test]
async fn test_rock_to_stone_skin_survives_reload() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), &stone_skin(), "Texture", b"granite pixels");

    let scene = prop_scene(&["Rock_01"]);
    let mut session = ModSession::open(config(temp.path())).unwrap();
    session
        .bind_asset_to_target("Rock_01", &stone_skin(), scene.find_by_name("Rock_01").unwrap())
        .unwrap();
    session.commit_bindings(&scene).unwrap();

    let mut reloaded = prop_scene(&["Tree_01", "Rock_01"]);
    let mut next = ModSession::open(config(temp.path())).unwrap();
    let report = next.apply_all_bindings(&mut reloaded).await.unwrap();

    let binding = next.registry().get("Rock_01").unwrap();
    assert_eq!(binding.descriptor, stone_skin());
    assert!(report.is_applied("Rock_01"));
    assert_eq!(main_texture(&reloaded, "Rock_01").as_deref(), Some("stone_albedo"));
    assert_eq!(main_texture(&reloaded, "Tree_01"), None);
}

#[tokio::test]
async fn test_reload_with_missing_target_drops_one_binding() {
    let temp = TempDir::new().unwrap();
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    let names = ["Rock_01", "Rock_02", "Rock_03"];

    let scene = prop_scene(&names);
    let mut session = ModSession::open(config(temp.path())).unwrap();
    for name in names {
        session
            .bind_asset_to_target(name, &stone_skin(), scene.find_by_name(name).unwrap())
            .unwrap();
    }
    session.commit_bindings(&scene).unwrap();

    let mut full = prop_scene(&names);
    let mut next = ModSession::open(config(temp.path())).unwrap();
    let report = next.apply_all_bindings(&mut full).await.unwrap();
    assert_eq!(next.registry().len(), 3);
    assert_eq!(report.applied().len(), 3);

    let mut partial = prop_scene(&["Rock_01", "Rock_03"]);
    let mut last = ModSession::open(config(temp.path())).unwrap();
    let report = last.apply_all_bindings(&mut partial).await.unwrap();

    assert_eq!(last.registry().len(), 2);
    assert!(report.is_clean());
    assert_eq!(report.dropped().len(), 1);
    assert_eq!(report.dropped()[0].as_str(), "Rock_02");
}

#[tokio::test]
async fn test_apply_without_bindings_file() {
    let temp = TempDir::new().unwrap();
    let mut scene = prop_scene(&["Rock_01"]);
    let mut session = ModSession::open(config(temp.path())).unwrap();

    let report = session.apply_all_bindings(&mut scene).await.unwrap();

    assert!(report.applied().is_empty());
    assert!(report.failed().is_empty());
}

// ============================================================================
// Replacement Through the Pipeline
// ============================================================================

#[tokio::test]
async fn test_failures_are_isolated_per_binding() {
    let temp = TempDir::new().unwrap();
    let missing_archive = package("Ghost", HOST_VERSION, "ghost_albedo");
    let scriptable = package("Rules", HOST_VERSION, "rules");
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    write_package(temp.path(), &missing_archive, "Texture", b"px");
    write_package(temp.path(), &scriptable, "ScriptableObject", b"{}");
    fs::remove_file(config(temp.path()).archive_path(&missing_archive)).unwrap();

    let mut scene = prop_scene(&["Rock_01", "Rock_02", "Rock_03"]);
    let marker = scene.spawn("Marker", Transform::default());

    let mut session = ModSession::open(config(temp.path())).unwrap();
    let rock = |s: &Scene, n: &str| s.find_by_name(n).unwrap();
    session
        .bind_asset_to_target("Rock_01", &stone_skin(), rock(&scene, "Rock_01"))
        .unwrap();
    session
        .bind_asset_to_target("Rock_02", &missing_archive, rock(&scene, "Rock_02"))
        .unwrap();
    session
        .bind_asset_to_target("Rock_03", &scriptable, rock(&scene, "Rock_03"))
        .unwrap();
    session
        .bind_asset_to_target("Marker", &stone_skin(), marker)
        .unwrap();
    session.commit_bindings(&scene).unwrap();

    let before_marker = scene.get(marker).unwrap().clone();
    let report = session.apply_all_bindings(&mut scene).await.unwrap();

    assert!(report.is_applied("Rock_01"));
    assert_eq!(main_texture(&scene, "Rock_01").as_deref(), Some("stone_albedo"));

    assert!(matches!(
        report.failure_for("Rock_02"),
        Some(ModError::Load(LoadError::ArchiveNotFound(_)))
    ));
    match report.failure_for("Rock_03") {
        Some(ModError::Load(e)) => {
            assert!(matches!(e, LoadError::AssetKindUnsupported { .. }));
            assert!(e.is_warning());
        }
        other => panic!("Expected unsupported kind, got {:?}", other),
    }
    assert!(matches!(
        report.failure_for("Marker"),
        Some(ModError::Replace(ReplaceError::TargetMissingCapability(
            AssetKind::Texture
        )))
    ));
    assert_eq!(scene.get(marker).unwrap(), &before_marker);
    assert_eq!(session.live_mounts(), 0);
}

#[tokio::test]
async fn test_corrupt_archive_index_fails_only_its_binding() {
    let temp = TempDir::new().unwrap();
    let wrapped = package("Wrapped", HOST_VERSION, "wrapped_albedo");
    let oversized = package("Oversized", HOST_VERSION, "oversized_albedo");
    write_package(temp.path(), &stone_skin(), "Texture", b"px");
    write_package_with_index(temp.path(), &wrapped, u64::MAX - 4, 2);
    write_package_with_index(temp.path(), &oversized, 0, 1 << 62);

    let mut scene = prop_scene(&["Rock_01", "Rock_02", "Rock_03"]);
    let mut session = ModSession::open(config(temp.path())).unwrap();
    let rock = |s: &Scene, n: &str| s.find_by_name(n).unwrap();
    session
        .bind_asset_to_target("Rock_01", &stone_skin(), rock(&scene, "Rock_01"))
        .unwrap();
    session
        .bind_asset_to_target("Rock_02", &wrapped, rock(&scene, "Rock_02"))
        .unwrap();
    session
        .bind_asset_to_target("Rock_03", &oversized, rock(&scene, "Rock_03"))
        .unwrap();
    session.commit_bindings(&scene).unwrap();

    let report = session.apply_all_bindings(&mut scene).await.unwrap();

    assert!(report.is_applied("Rock_01"));
    assert_eq!(main_texture(&scene, "Rock_01").as_deref(), Some("stone_albedo"));
    for name in ["Rock_02", "Rock_03"] {
        assert!(
            matches!(
                report.failure_for(name),
                Some(ModError::Load(LoadError::ExtractionFailed { .. }))
            ),
            "{} should fail extraction",
            name
        );
        assert_eq!(main_texture(&scene, name), None);
    }
    assert_eq!(session.live_mounts(), 0);
}

#[tokio::test]
async fn test_whole_object_retires_target_identity() {
    let temp = TempDir::new().unwrap();
    let boulder = package("Boulder", HOST_VERSION, "boulder_prefab");
    let template = ObjectTemplate::new("Boulder", Components::mesh_prop());
    write_package(temp.path(), &boulder, "GameObject", &template.to_json().unwrap());

    let mut scene = Scene::new();
    let rock = scene.spawn_with(
        "Rock_01",
        Transform::at(Vec3::new(7.0, 0.5, -1.0)),
        Components::mesh_prop(),
        None,
    );

    let mut session = ModSession::open(config(temp.path())).unwrap();
    session
        .bind_asset_to_target("Rock_01", &boulder, rock)
        .unwrap();
    session.commit_bindings(&scene).unwrap();

    let report = session.apply_all_bindings(&mut scene).await.unwrap();

    let spawned = match report.applied()[0].replacement {
        Replacement::Respawned { retired, spawned } => {
            assert_eq!(retired, rock);
            spawned
        }
        other => panic!("Expected respawn, got {:?}", other),
    };

    // The replaced object's name no longer resolves.
    assert_eq!(scene.find_by_name("Rock_01"), None);
    assert!(scene.get(rock).is_none());

    let object = scene.get(spawned).unwrap();
    assert_eq!(object.name, "Boulder(Clone)");
    assert_eq!(object.transform.position, Vec3::new(7.0, 0.5, -1.0));
    assert_eq!(session.registry().get("Rock_01").unwrap().target, spawned);

    // A later session cannot re-resolve the saved identity.
    session.commit_bindings(&scene).unwrap();
    let mut next = ModSession::open(config(temp.path())).unwrap();
    let report = next.apply_all_bindings(&mut scene).await.unwrap();
    assert_eq!(report.dropped()[0].as_str(), "Rock_01");
    assert!(next.registry().is_empty());
}

#[tokio::test]
async fn test_compressed_archive_entries_apply() {
    let temp = TempDir::new().unwrap();
    let song = package("Shanty", HOST_VERSION, "shanty_clip");
    let cfg = config(temp.path());
    let dir = cfg.packages_dir().join("Shanty");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Shanty.manifest"), song.to_json().unwrap()).unwrap();
    ArchiveBuilder::new()
        .compressed_entry("shanty_clip", "AudioClip", &[42u8; 4096])
        .unwrap()
        .write_to(&cfg.archive_path(&song))
        .unwrap();

    let mut scene = Scene::new();
    let radio = scene.spawn_with(
        "Radio",
        Transform::default(),
        Components::new().with_audio_source(),
        None,
    );

    let mut session = ModSession::open(cfg).unwrap();
    session.bind_asset_to_target("Radio", &song, radio).unwrap();
    session.commit_bindings(&scene).unwrap();
    let report = session.apply_all_bindings(&mut scene).await.unwrap();

    assert!(report.is_clean());
    let clip = scene
        .get(radio)
        .unwrap()
        .components
        .audio_source
        .as_ref()
        .unwrap()
        .clip
        .as_ref()
        .unwrap();
    assert_eq!(clip.bytes.len(), 4096);
}
