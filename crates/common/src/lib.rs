//! Perimeter Common Library
//!
//! Shared model types and the error taxonomy for the Perimeter SDK.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Perimeter SDK version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
