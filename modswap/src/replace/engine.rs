//! Kind-dispatched replacement of scene object content.

use tracing::debug;

use super::error::ReplaceError;
use crate::asset::{AssetData, AssetKind, ExtractedAsset};
use crate::scene::{Material, ObjectId, ObjectTemplate, Scene, Transform};

/// Outcome of a successful replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Replacement {
    /// A component of the target was swapped in place.
    Updated { kind: AssetKind },
    /// The target was retired and a new object spawned in its place.
    Respawned { retired: ObjectId, spawned: ObjectId },
}

impl Replacement {
    /// The object that now carries the asset.
    pub fn live_object(&self, target: ObjectId) -> ObjectId {
        match self {
            Self::Updated { .. } => target,
            Self::Respawned { spawned, .. } => *spawned,
        }
    }
}

/// Applies extracted assets to scene objects.
///
/// Dispatch is on the asset kind only. Each kind needs one capability on the
/// target; when it is absent the target is left untouched and
/// [`ReplaceError::TargetMissingCapability`] is returned.
///
/// | Kind | Capability | Effect |
/// |------|------------|--------|
/// | Texture | renderer | main texture swapped |
/// | Material | renderer | whole material swapped |
/// | Mesh | mesh filter | geometry swapped |
/// | Animation | animation player | clip swapped |
/// | AudioClip | audio source | clip swapped |
/// | Sprite | sprite renderer | sprite swapped |
/// | Shader | renderer | material shader swapped |
/// | Font | text mesh | font swapped |
/// | WholeObject | none | new object at target placement, target retired |
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplacementEngine;

impl ReplacementEngine {
    pub fn new() -> Self {
        Self
    }

    /// Apply `asset` to `target`, consuming the asset.
    pub fn apply(
        &self,
        scene: &mut Scene,
        asset: ExtractedAsset,
        target: ObjectId,
    ) -> Result<Replacement, ReplaceError> {
        let kind = asset.kind();
        let missing = || ReplaceError::TargetMissingCapability(kind);

        let object = scene
            .get_mut(target)
            .ok_or(ReplaceError::TargetNotFound(target))?;
        let components = &mut object.components;

        match asset {
            ExtractedAsset::Texture(data) => {
                let renderer = components.renderer.as_mut().ok_or_else(missing)?;
                renderer.material.main_texture = Some(data);
            }
            ExtractedAsset::Material(data) => {
                let renderer = components.renderer.as_mut().ok_or_else(missing)?;
                renderer.material = Material::from_asset(data);
            }
            ExtractedAsset::Mesh(data) => {
                let filter = components.mesh_filter.as_mut().ok_or_else(missing)?;
                filter.mesh = Some(data);
            }
            ExtractedAsset::Animation(data) => {
                let player = components.animation.as_mut().ok_or_else(missing)?;
                player.clip = Some(data);
            }
            ExtractedAsset::AudioClip(data) => {
                let source = components.audio_source.as_mut().ok_or_else(missing)?;
                source.clip = Some(data);
            }
            ExtractedAsset::Sprite(data) => {
                let sprite = components.sprite_renderer.as_mut().ok_or_else(missing)?;
                sprite.sprite = Some(data);
            }
            ExtractedAsset::Shader(data) => {
                let renderer = components.renderer.as_mut().ok_or_else(missing)?;
                renderer.material.shader = Some(data);
            }
            ExtractedAsset::Font(data) => {
                let text = components.text_mesh.as_mut().ok_or_else(missing)?;
                text.font = Some(data);
            }
            ExtractedAsset::WholeObject(data) => return respawn(scene, target, data),
        }

        debug!(object = %target, kind = %kind, "Replaced component");
        Ok(Replacement::Updated { kind })
    }
}

/// Spawn the template at the target's position, rotation and parent, then
/// retire the target.
fn respawn(scene: &mut Scene, target: ObjectId, data: AssetData) -> Result<Replacement, ReplaceError> {
    let template =
        ObjectTemplate::from_json(&data.bytes).map_err(|e| ReplaceError::InvalidPayload {
            kind: AssetKind::WholeObject,
            asset: data.name.clone(),
            reason: e.to_string(),
        })?;

    let (placement, parent) = match scene.get(target) {
        Some(object) => (
            Transform::at(object.transform.position).with_rotation(object.transform.rotation),
            object.parent,
        ),
        None => return Err(ReplaceError::TargetNotFound(target)),
    };

    let spawned = scene.instantiate(&template, placement, parent);
    scene.retire(target);

    debug!(
        retired = %target,
        spawned = %spawned,
        template = %template.name,
        "Replaced whole object"
    );

    Ok(Replacement::Respawned {
        retired: target,
        spawned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Components, Quat, Vec3};

    fn asset(kind: AssetKind, name: &str) -> ExtractedAsset {
        ExtractedAsset::new(kind, AssetData::new(name, name.as_bytes().to_vec()))
    }

    fn whole_object(template: &ObjectTemplate) -> ExtractedAsset {
        ExtractedAsset::WholeObject(AssetData::new(
            template.name.clone(),
            template.to_json().unwrap(),
        ))
    }

    fn full_components() -> Components {
        Components::mesh_prop()
            .with_animation()
            .with_audio_source()
            .with_sprite_renderer()
            .with_text_mesh("sign")
    }

    #[test]
    fn test_texture_replaces_main_texture() {
        let mut scene = Scene::new();
        let rock = scene.spawn_with("Rock_01", Transform::default(), Components::mesh_prop(), None);

        let result = ReplacementEngine::new()
            .apply(&mut scene, asset(AssetKind::Texture, "stone_albedo"), rock)
            .unwrap();

        assert_eq!(result, Replacement::Updated { kind: AssetKind::Texture });
        let material = &scene.get(rock).unwrap().components.renderer.as_ref().unwrap().material;
        assert_eq!(material.main_texture.as_ref().unwrap().name, "stone_albedo");
    }

    #[test]
    fn test_texture_without_renderer_leaves_target_unmodified() {
        let mut scene = Scene::new();
        let empty = scene.spawn_with(
            "Marker",
            Transform::at(Vec3::new(1.0, 2.0, 3.0)),
            Components::new().with_audio_source(),
            None,
        );
        let before = scene.get(empty).unwrap().clone();

        let result = ReplacementEngine::new().apply(
            &mut scene,
            asset(AssetKind::Texture, "stone_albedo"),
            empty,
        );

        assert!(matches!(
            result,
            Err(ReplaceError::TargetMissingCapability(AssetKind::Texture))
        ));
        assert_eq!(scene.get(empty).unwrap(), &before);
    }

    #[test]
    fn test_material_replaces_whole_material() {
        let mut scene = Scene::new();
        let rock = scene.spawn_with("Rock_01", Transform::default(), Components::mesh_prop(), None);
        let engine = ReplacementEngine::new();

        engine
            .apply(&mut scene, asset(AssetKind::Texture, "old_albedo"), rock)
            .unwrap();
        engine
            .apply(&mut scene, asset(AssetKind::Material, "granite"), rock)
            .unwrap();

        let material = &scene.get(rock).unwrap().components.renderer.as_ref().unwrap().material;
        assert_eq!(material.source.as_ref().unwrap().name, "granite");
        assert!(material.main_texture.is_none());
    }

    #[test]
    fn test_each_component_kind_lands_in_its_slot() {
        let mut scene = Scene::new();
        let target = scene.spawn_with("Prop", Transform::default(), full_components(), None);
        let engine = ReplacementEngine::new();

        for kind in [
            AssetKind::Mesh,
            AssetKind::Animation,
            AssetKind::AudioClip,
            AssetKind::Sprite,
            AssetKind::Shader,
            AssetKind::Font,
        ] {
            let result = engine.apply(&mut scene, asset(kind, kind.tag()), target).unwrap();
            assert_eq!(result, Replacement::Updated { kind });
        }

        let c = &scene.get(target).unwrap().components;
        assert_eq!(c.mesh_filter.as_ref().unwrap().mesh.as_ref().unwrap().name, "Mesh");
        assert_eq!(c.animation.as_ref().unwrap().clip.as_ref().unwrap().name, "Animation");
        assert_eq!(c.audio_source.as_ref().unwrap().clip.as_ref().unwrap().name, "AudioClip");
        assert_eq!(c.sprite_renderer.as_ref().unwrap().sprite.as_ref().unwrap().name, "Sprite");
        assert_eq!(
            c.renderer.as_ref().unwrap().material.shader.as_ref().unwrap().name,
            "Shader"
        );
        assert_eq!(c.text_mesh.as_ref().unwrap().font.as_ref().unwrap().name, "Font");
    }

    #[test]
    fn test_every_component_kind_refuses_bare_target() {
        let mut scene = Scene::new();
        let bare = scene.spawn("Empty", Transform::default());
        let engine = ReplacementEngine::new();

        for kind in AssetKind::ALL {
            if kind == AssetKind::WholeObject {
                continue;
            }
            let result = engine.apply(&mut scene, asset(kind, "x"), bare);
            match result {
                Err(ReplaceError::TargetMissingCapability(k)) => assert_eq!(k, kind),
                other => panic!("Expected missing capability for {}, got {:?}", kind, other),
            }
        }
        assert_eq!(scene.get(bare).unwrap().components, Components::default());
    }

    #[test]
    fn test_whole_object_retires_target_and_breaks_name_lookup() {
        let mut scene = Scene::new();
        let island = scene.spawn("Island", Transform::default());
        let rotation = Quat::new(0.0, 0.7071, 0.0, 0.7071);
        let rock = scene.spawn_with(
            "Rock_01",
            Transform::at(Vec3::new(4.0, 0.0, 2.0))
                .with_rotation(rotation)
                .with_scale(Vec3::new(3.0, 3.0, 3.0)),
            Components::mesh_prop(),
            Some(island),
        );

        let template = ObjectTemplate::new("Boulder", Components::mesh_prop());
        let result = ReplacementEngine::new()
            .apply(&mut scene, whole_object(&template), rock)
            .unwrap();

        let spawned = match result {
            Replacement::Respawned { retired, spawned } => {
                assert_eq!(retired, rock);
                spawned
            }
            other => panic!("Expected respawn, got {:?}", other),
        };

        assert!(!scene.contains(rock));
        assert_eq!(scene.find_by_name("Rock_01"), None);

        let object = scene.get(spawned).unwrap();
        assert_eq!(object.name, "Boulder(Clone)");
        assert_eq!(object.parent, Some(island));
        assert_eq!(object.transform.position, Vec3::new(4.0, 0.0, 2.0));
        assert_eq!(object.transform.rotation, rotation);
        assert_eq!(object.transform.scale, Vec3::ONE);
        assert_eq!(result.live_object(rock), spawned);
    }

    #[test]
    fn test_stale_handle_after_whole_object() {
        let mut scene = Scene::new();
        let rock = scene.spawn_with("Rock_01", Transform::default(), Components::mesh_prop(), None);
        let engine = ReplacementEngine::new();
        let template = ObjectTemplate::new("Boulder", Components::mesh_prop());

        engine.apply(&mut scene, whole_object(&template), rock).unwrap();
        let result = engine.apply(&mut scene, asset(AssetKind::Texture, "moss"), rock);

        assert!(matches!(result, Err(ReplaceError::TargetNotFound(id)) if id == rock));
    }

    #[test]
    fn test_whole_object_invalid_payload_keeps_target() {
        let mut scene = Scene::new();
        let rock = scene.spawn("Rock_01", Transform::default());
        let garbage = ExtractedAsset::WholeObject(AssetData::new("broken", b"not json".to_vec()));

        let result = ReplacementEngine::new().apply(&mut scene, garbage, rock);

        assert!(matches!(result, Err(ReplaceError::InvalidPayload { .. })));
        assert!(scene.contains(rock));
        assert_eq!(scene.len(), 1);
    }
}
