//! Call stack capture
//!
//! Frames are captured with the platform's execinfo unwinder into a
//! fixed-capacity buffer that lives on the caller's stack. Nothing here
//! allocates, so a [`FrameBuffer`] can be filled from inside a signal
//! handler. [`PlatformSymbols`] is the allocating counterpart used by the
//! stack walker to obtain the platform's one-line description of each frame.

#![allow(unsafe_code)] // execinfo FFI

use crate::domain::Address;
use std::borrow::Cow;
use std::ffi::{c_int, CStr};
use std::fmt;

/// Capacity of a [`FrameBuffer`]
pub const MAX_FRAMES: usize = 128;

/// Fixed-capacity list of return addresses, innermost frame first
#[derive(Clone)]
pub struct FrameBuffer {
    ips: [usize; MAX_FRAMES],
    len: usize,
}

impl FrameBuffer {
    #[must_use]
    pub const fn empty() -> Self {
        Self { ips: [0; MAX_FRAMES], len: 0 }
    }

    /// Unwind the calling thread's stack
    ///
    /// Frame 0 is this function. When the stack is deeper than
    /// [`MAX_FRAMES`], only the innermost frames are kept and
    /// [`is_truncated`](Self::is_truncated) reports it.
    #[inline(never)]
    #[must_use]
    pub fn capture() -> Self {
        let mut frames = Self::empty();
        frames.len = platform::unwind(&mut frames.ips);
        frames
    }

    /// Build a frame list from known addresses, keeping at most [`MAX_FRAMES`]
    #[must_use]
    pub fn from_addresses(addresses: &[Address]) -> Self {
        let mut frames = Self::empty();
        for (slot, addr) in frames.ips.iter_mut().zip(addresses) {
            *slot = addr.get();
            frames.len += 1;
        }
        frames
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The unwinder filled every slot, so outer frames may have been dropped
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.len == MAX_FRAMES
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Address> {
        self.as_slice().get(index).copied().map(Address)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.ips[..self.len]
    }

    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.as_slice().iter().copied().map(Address)
    }

    /// Write the platform's one-line description of every frame to `fd`
    ///
    /// Async-signal-safe: no allocation, no locks. Write failures are
    /// dropped.
    pub fn write_symbols_to_fd(&self, fd: c_int) {
        platform::symbols_fd(self.as_slice(), fd);
    }
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("len", &self.len)
            .field("truncated", &self.is_truncated())
            .finish()
    }
}

/// The platform's default symbol strings for a frame list
///
/// Owns the array returned by the platform and frees it on drop.
pub struct PlatformSymbols {
    raw: platform::SymbolArray,
    len: usize,
}

impl PlatformSymbols {
    #[must_use]
    pub fn for_frames(frames: &FrameBuffer) -> Self {
        let raw = platform::symbols(frames.as_slice());
        let len = if raw.is_null() { 0 } else { frames.len() };
        Self { raw, len }
    }

    /// Line for frame `index`, or `None` when the platform produced nothing
    #[must_use]
    pub fn line(&self, index: usize) -> Option<Cow<'_, str>> {
        if index >= self.len {
            return None;
        }
        // SAFETY: the array holds `len` entries and lives until drop
        let entry = unsafe { *self.raw.add(index) };
        if entry.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(entry) }.to_string_lossy())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for PlatformSymbols {
    fn drop(&mut self) {
        platform::free_symbols(self.raw);
    }
}

#[cfg(all(unix, not(target_env = "musl"), not(target_os = "android")))]
mod platform {
    use std::ffi::{c_char, c_int, c_void};

    pub type SymbolArray = *mut *mut c_char;

    extern "C" {
        fn backtrace(buffer: *mut *mut c_void, size: c_int) -> c_int;
        fn backtrace_symbols(buffer: *const *mut c_void, size: c_int) -> *mut *mut c_char;
        fn backtrace_symbols_fd(buffer: *const *mut c_void, size: c_int, fd: c_int);
    }

    fn frame_count(len: usize) -> c_int {
        c_int::try_from(len).unwrap_or(c_int::MAX)
    }

    // Always inlined so `FrameBuffer::capture` is frame 0 in every profile
    #[inline(always)]
    pub fn unwind(ips: &mut [usize]) -> usize {
        let depth = unsafe { backtrace(ips.as_mut_ptr().cast::<*mut c_void>(), frame_count(ips.len())) };
        usize::try_from(depth).unwrap_or(0)
    }

    pub fn symbols(ips: &[usize]) -> SymbolArray {
        if ips.is_empty() {
            return std::ptr::null_mut();
        }
        unsafe { backtrace_symbols(ips.as_ptr().cast::<*mut c_void>(), frame_count(ips.len())) }
    }

    pub fn symbols_fd(ips: &[usize], fd: c_int) {
        if ips.is_empty() {
            return;
        }
        unsafe { backtrace_symbols_fd(ips.as_ptr().cast::<*mut c_void>(), frame_count(ips.len()), fd) }
    }

    pub fn free_symbols(raw: SymbolArray) {
        if !raw.is_null() {
            // The strings share the array's allocation
            unsafe { libc::free(raw.cast::<c_void>()) }
        }
    }
}

#[cfg(not(all(unix, not(target_env = "musl"), not(target_os = "android"))))]
mod platform {
    use std::ffi::{c_char, c_int};

    pub type SymbolArray = *mut *mut c_char;

    #[inline(always)]
    pub fn unwind(_ips: &mut [usize]) -> usize {
        0
    }

    pub fn symbols(_ips: &[usize]) -> SymbolArray {
        std::ptr::null_mut()
    }

    pub fn symbols_fd(_ips: &[usize], _fd: c_int) {}

    pub fn free_symbols(_raw: SymbolArray) {}
}
