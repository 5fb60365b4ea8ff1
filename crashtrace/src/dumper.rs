//! Safe Dumper: write the call stack to a file descriptor from a signal handler
//!
//! Everything on this path is async-signal-safe. The frame list lives on
//! the stack, the platform formats each frame straight into `write(2)`
//! calls, and no lock or allocator is touched. There is no error channel;
//! a bad descriptor or a short write simply loses output.

use std::ffi::c_int;

use crate::capture::FrameBuffer;

/// Load the platform unwinder ahead of time
///
/// Some unwinders are loaded lazily on first use (glibc `dlopen`s libgcc
/// the first time `backtrace` runs), which allocates. Call this once during
/// startup, before any handler that uses [`dump_to_fd`] can fire.
pub fn prime() {
    let frames = FrameBuffer::capture();
    std::hint::black_box(&frames);
}

/// Capture the calling thread's stack and write one line per frame to `fd`
///
/// Frames are written innermost first and include this function's own
/// frames. The descriptor is not validated.
#[inline(never)]
pub fn dump_to_fd(fd: c_int) {
    let frames = FrameBuffer::capture();
    dump_frames_to_fd(&frames, fd);
}

/// Write an already captured frame list to `fd`
pub fn dump_frames_to_fd(frames: &FrameBuffer, fd: c_int) {
    frames.write_symbols_to_fd(fd);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_to_invalid_fd_returns() {
        prime();
        dump_to_fd(-1);
    }

    #[test]
    fn test_dump_empty_frames_is_noop() {
        dump_frames_to_fd(&FrameBuffer::empty(), -1);
    }
}
