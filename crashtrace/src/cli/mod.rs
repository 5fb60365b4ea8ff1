//! CLI argument definitions and helpers for the `crashtrace` binary

pub mod args;
pub mod padding;

pub use args::{Args, Command};
pub use padding::{with_stack_depth, MAX_PADDING_DEPTH};
