//! Structured error types for crashtrace
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! The trace operations themselves never fail; these cover the surfaces
//! around them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("Failed to read {path}")]
    MapsReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed maps line {line_no}: {line}")]
    MalformedLine { line_no: usize, line: String },

    #[error("Invalid address range 0x{start:x}-0x{end:x}")]
    InvalidRange { start: usize, end: usize },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid file descriptor: {0}")]
    InvalidFd(i32),

    #[error("Recursion depth {depth} exceeds the maximum of {max}")]
    DepthTooLarge { depth: usize, max: usize },
}
