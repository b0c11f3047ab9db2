//! In-memory scene graph.

use std::collections::BTreeMap;

use tracing::trace;

use super::object::{Components, ObjectId, ObjectTemplate, SceneObject, Transform};

/// A flat collection of live objects with parent links.
///
/// Objects are kept in creation order, which is also the order
/// [`find_by_name`](Self::find_by_name) searches in. Names are not unique;
/// the first live match wins.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: BTreeMap<ObjectId, SceneObject>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Add a root object with no components.
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> ObjectId {
        self.spawn_with(name, transform, Components::default(), None)
    }

    /// Add an object with components under an optional parent.
    ///
    /// A parent handle that no longer resolves is treated as no parent.
    pub fn spawn_with(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
        components: Components,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let parent = parent.filter(|p| self.objects.contains_key(p));
        let object = SceneObject {
            id,
            name: name.into(),
            transform,
            parent,
            components,
        };

        trace!(id = %id, name = %object.name, "Object spawned");
        self.objects.insert(id, object);
        id
    }

    /// Create an object from a template at the given placement.
    ///
    /// The instance is named after the template with a `(Clone)` suffix and
    /// keeps the template's scale when it has one.
    pub fn instantiate(
        &mut self,
        template: &ObjectTemplate,
        transform: Transform,
        parent: Option<ObjectId>,
    ) -> ObjectId {
        let transform = match template.scale {
            Some(scale) => transform.with_scale(scale),
            None => transform,
        };
        self.spawn_with(
            template.instance_name(),
            transform,
            template.components.clone(),
            parent,
        )
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// First live object with exactly this name.
    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .values()
            .find(|object| object.name == name)
            .map(|object| object.id)
    }

    /// Direct children of `id`.
    pub fn children(&self, id: ObjectId) -> Vec<ObjectId> {
        self.objects
            .values()
            .filter(|object| object.parent == Some(id))
            .map(|object| object.id)
            .collect()
    }

    /// Remove an object and all of its descendants.
    ///
    /// Returns the removed root, or `None` if the handle was already stale.
    pub fn retire(&mut self, id: ObjectId) -> Option<SceneObject> {
        let root = self.objects.remove(&id)?;

        let mut pending = self.children(id);
        while let Some(child) = pending.pop() {
            pending.extend(self.children(child));
            self.objects.remove(&child);
        }

        trace!(id = %id, name = %root.name, "Object retired");
        Some(root)
    }

    /// Iterate live objects in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }
}
