//! Error types for applying assets to scene objects.

use thiserror::Error;

use crate::asset::AssetKind;
use crate::scene::ObjectId;

/// Per-target replacement failures.
///
/// A failed replacement leaves the target exactly as it was.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// The target has no component the asset kind can be applied to.
    #[error("target lacks the capability needed for a {0} asset")]
    TargetMissingCapability(AssetKind),

    /// The handle no longer resolves to a live object.
    #[error("target {0} is not in the scene")]
    TargetNotFound(ObjectId),

    /// The asset payload could not be decoded for its kind.
    #[error("invalid {kind} payload in '{asset}': {reason}")]
    InvalidPayload {
        kind: AssetKind,
        asset: String,
        reason: String,
    },
}

impl ReplaceError {
    /// The asset kind involved, when known.
    pub fn kind(&self) -> Option<AssetKind> {
        match self {
            Self::TargetMissingCapability(kind) => Some(*kind),
            Self::InvalidPayload { kind, .. } => Some(*kind),
            Self::TargetNotFound(_) => None,
        }
    }
}
