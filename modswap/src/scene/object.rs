//! Scene objects, transforms and component slots.

use serde::{Deserialize, Serialize};

use crate::asset::AssetData;

/// A 3-component vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const ONE: Vec3 = Vec3::new(1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A rotation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Position, rotation and scale of an object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Identity rotation and unit scale at `position`.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Surface material of a renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Material {
    /// Material asset this material was created from, if replaced.
    pub source: Option<AssetData>,
    /// Primary surface texture.
    pub main_texture: Option<AssetData>,
    /// Shader program.
    pub shader: Option<AssetData>,
}

impl Material {
    /// A material created wholesale from a material asset.
    pub fn from_asset(asset: AssetData) -> Self {
        Self {
            source: Some(asset),
            main_texture: None,
            shader: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Renderer {
    pub material: Material,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshFilter {
    pub mesh: Option<AssetData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationPlayer {
    pub clip: Option<AssetData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSource {
    pub clip: Option<AssetData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteRenderer {
    pub sprite: Option<AssetData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextMesh {
    pub text: String,
    pub font: Option<AssetData>,
}

/// Optional capability slots of an object.
///
/// An absent slot means the object lacks that capability; replacements that
/// need it are refused rather than creating it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Components {
    pub renderer: Option<Renderer>,
    pub mesh_filter: Option<MeshFilter>,
    pub animation: Option<AnimationPlayer>,
    pub audio_source: Option<AudioSource>,
    pub sprite_renderer: Option<SpriteRenderer>,
    pub text_mesh: Option<TextMesh>,
}

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_renderer(mut self) -> Self {
        self.renderer = Some(Renderer::default());
        self
    }

    pub fn with_mesh_filter(mut self) -> Self {
        self.mesh_filter = Some(MeshFilter::default());
        self
    }

    pub fn with_animation(mut self) -> Self {
        self.animation = Some(AnimationPlayer::default());
        self
    }

    pub fn with_audio_source(mut self) -> Self {
        self.audio_source = Some(AudioSource::default());
        self
    }

    pub fn with_sprite_renderer(mut self) -> Self {
        self.sprite_renderer = Some(SpriteRenderer::default());
        self
    }

    pub fn with_text_mesh(mut self, text: impl Into<String>) -> Self {
        self.text_mesh = Some(TextMesh {
            text: text.into(),
            font: None,
        });
        self
    }

    /// The typical 3D prop: renderer plus mesh filter.
    pub fn mesh_prop() -> Self {
        Self::new().with_renderer().with_mesh_filter()
    }
}

/// Handle to an object in a [`Scene`](super::Scene).
///
/// Handles are never reused within one scene, so a handle to a retired
/// object stays dangling instead of pointing at a newer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One live object.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub id: ObjectId,
    /// Display name, used as the cross-session identity.
    pub name: String,
    pub transform: Transform,
    pub parent: Option<ObjectId>,
    pub components: Components,
}

/// Blueprint for a whole object, decoded from a WholeObject asset payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectTemplate {
    pub name: String,
    pub scale: Option<Vec3>,
    pub components: Components,
}

impl ObjectTemplate {
    pub fn new(name: impl Into<String>, components: Components) -> Self {
        Self {
            name: name.into(),
            scale: None,
            components,
        }
    }

    /// Decode a template from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encode the template as JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Name given to objects instantiated from this template.
    pub fn instance_name(&self) -> String {
        format!("{}(Clone)", self.name)
    }
}
