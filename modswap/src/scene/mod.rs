//! Minimal scene model that replacement targets live in.
//!
//! Objects are addressed two ways:
//!
//! - [`ObjectId`]: a live handle, valid until the object is retired.
//! - the object's display name: the only identity that survives a session,
//!   resolved with [`Scene::find_by_name`].

mod graph;
mod object;

pub use graph::Scene;
pub use object::{
    AnimationPlayer, AudioSource, Components, Material, MeshFilter, ObjectId, ObjectTemplate, Quat,
    Renderer, SceneObject, SpriteRenderer, TextMesh, Transform, Vec3,
};
