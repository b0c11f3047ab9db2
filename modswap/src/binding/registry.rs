//! In-memory binding registry.

use std::collections::BTreeMap;

use super::identity::TargetIdentity;
use crate::package::PackageDescriptor;
use crate::scene::ObjectId;

/// A package bound to a target object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub identity: TargetIdentity,
    pub descriptor: PackageDescriptor,
    /// Live handle, valid for the current session only.
    pub target: ObjectId,
}

/// Mapping of target identity to binding, at most one binding per identity.
///
/// Iteration is in identity order, which is also the order bindings are
/// persisted and applied in.
#[derive(Debug, Clone, Default)]
pub struct BindingRegistry {
    bindings: BTreeMap<TargetIdentity, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `descriptor` to `target`, replacing any binding for `identity`.
    ///
    /// Returns the replaced binding so the caller can retire whatever it set
    /// up for it.
    pub fn bind(
        &mut self,
        identity: impl Into<TargetIdentity>,
        descriptor: PackageDescriptor,
        target: ObjectId,
    ) -> Option<Binding> {
        let identity = identity.into();
        let binding = Binding {
            identity: identity.clone(),
            descriptor,
            target,
        };
        self.bindings.insert(identity, binding)
    }

    /// Remove the binding for `identity`, returning it if present.
    pub fn unbind(&mut self, identity: &str) -> Option<Binding> {
        self.bindings.remove(identity)
    }

    pub fn get(&self, identity: &str) -> Option<&Binding> {
        self.bindings.get(identity)
    }

    pub fn all_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    pub fn identities(&self) -> impl Iterator<Item = &TargetIdentity> {
        self.bindings.keys()
    }

    /// Bindings that use `descriptor`.
    pub fn bindings_for<'a>(
        &'a self,
        descriptor: &'a PackageDescriptor,
    ) -> impl Iterator<Item = &'a Binding> + 'a {
        self.bindings
            .values()
            .filter(move |binding| &binding.descriptor == descriptor)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
