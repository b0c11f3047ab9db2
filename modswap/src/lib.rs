//! Modswap - run-time mod packages for interactive applications
//!
//! This library discovers mod packages on disk, checks them against the
//! running host version, lets a host bind packaged assets to scene objects,
//! persists those bindings and re-applies them on a later run.
//!
//! The host drives everything through [`ModSession`]; the component modules
//! are public for hosts that want to wire the pipeline themselves.

pub mod asset;
pub mod binding;
pub mod compat;
pub mod config;
pub mod error;
pub mod logging;
pub mod package;
pub mod replace;
pub mod scene;
pub mod session;

pub use config::ModsConfig;
pub use error::{ModError, ModResult};
pub use session::{ApplyReport, ModSession};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
