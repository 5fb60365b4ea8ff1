//! Synthetic call-stack depth
//!
//! Runs a closure underneath a known number of extra frames, so the effect
//! of stack depth on capture (including truncation) can be observed.

use crate::domain::CliError;

/// Deepest padding accepted from the command line
pub const MAX_PADDING_DEPTH: usize = 10_000;

/// Run `f` beneath `depth` additional non-inlined frames
///
/// # Errors
/// Returns an error if `depth` exceeds [`MAX_PADDING_DEPTH`]
pub fn with_stack_depth<T>(depth: usize, f: impl FnOnce() -> T) -> Result<T, CliError> {
    if depth > MAX_PADDING_DEPTH {
        return Err(CliError::DepthTooLarge { depth, max: MAX_PADDING_DEPTH });
    }
    Ok(descend(depth, f))
}

#[inline(never)]
fn descend<T, F: FnOnce() -> T>(depth: usize, f: F) -> T {
    if depth == 0 {
        return f();
    }
    // black_box keeps the recursion from becoming a tail call
    std::hint::black_box(descend(depth - 1, f))
}
