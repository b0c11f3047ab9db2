//! Typed replacement of scene object content with extracted assets.

mod engine;
mod error;

pub use engine::{Replacement, ReplacementEngine};
pub use error::ReplaceError;
