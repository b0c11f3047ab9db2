//! Cross-session identity of a binding target.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The display name a binding target is keyed and re-resolved by.
///
/// Names are not guaranteed unique. Resolution picks the first live object
/// with the name; keeping names unique is up to whoever builds the scene.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetIdentity(String);

impl TargetIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for TargetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for TargetIdentity {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TargetIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TargetIdentity {
    fn from(name: String) -> Self {
        Self(name)
    }
}
