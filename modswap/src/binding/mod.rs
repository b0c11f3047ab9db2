//! Bindings of packages to scene objects and their persistence.
//!
//! A binding lives in two forms:
//!
//! ```text
//! in session                              on disk
//! ──────────                              ───────
//! TargetIdentity ──► Binding              Keys[i]
//!                    ├── descriptor  ──►  ModPackages[i] (JSON string)
//!                    └── target      ──►  GameObjects[i] (name + transform)
//!                        (ObjectId)
//! ```
//!
//! Going to disk loses the live handle. Loading resolves it again by name,
//! which fails for objects renamed or replaced in the meantime.

mod error;
mod identity;
mod persistence;
mod registry;

pub use error::PersistenceError;
pub use identity::TargetIdentity;
pub use persistence::{BindingStore, LoadedBindings, ObjectSnapshot};
pub use registry::{Binding, BindingRegistry};
