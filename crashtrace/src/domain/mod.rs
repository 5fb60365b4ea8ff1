//! Domain model for crashtrace
//!
//! This module contains core domain types and errors that provide:
//! - Compile-time separation of addresses from plain integers
//! - Structured error handling for the fallible surfaces

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{Address, FrameIndex};

pub use errors::{CliError, RegionError};
