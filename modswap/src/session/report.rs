//! Outcome of applying all bindings.

use std::fmt;

use crate::binding::TargetIdentity;
use crate::error::ModError;
use crate::package::PackageDescriptor;
use crate::replace::Replacement;

/// A binding whose asset was applied.
#[derive(Debug)]
pub struct AppliedBinding {
    pub identity: TargetIdentity,
    pub package: PackageDescriptor,
    pub replacement: Replacement,
}

/// A binding that was skipped because its asset failed to load or apply.
#[derive(Debug)]
pub struct FailedBinding {
    pub identity: TargetIdentity,
    pub package: PackageDescriptor,
    pub error: ModError,
}

/// Per-binding results of [`ModSession::apply_all_bindings`](super::ModSession::apply_all_bindings).
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub(crate) applied: Vec<AppliedBinding>,
    pub(crate) failed: Vec<FailedBinding>,
    pub(crate) dropped: Vec<TargetIdentity>,
}

impl ApplyReport {
    pub fn applied(&self) -> &[AppliedBinding] {
        &self.applied
    }

    pub fn failed(&self) -> &[FailedBinding] {
        &self.failed
    }

    /// Persisted identities with no matching object in the scene.
    pub fn dropped(&self) -> &[TargetIdentity] {
        &self.dropped
    }

    /// Whether every loaded binding was applied.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn is_applied(&self, identity: &str) -> bool {
        self.applied.iter().any(|a| a.identity.as_str() == identity)
    }

    pub fn failure_for(&self, identity: &str) -> Option<&ModError> {
        self.failed
            .iter()
            .find(|f| f.identity.as_str() == identity)
            .map(|f| &f.error)
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} applied, {} failed, {} dropped",
            self.applied.len(),
            self.failed.len(),
            self.dropped.len()
        )
    }
}
