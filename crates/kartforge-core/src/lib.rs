//! kartforge-core
//!
//! Shared foundation for the kartforge exporter crates: the unified error
//! type and the source-to-game coordinate conversion.

pub mod convert;
pub mod error;

pub use error::{Error, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
