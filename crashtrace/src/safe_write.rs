//! Allocation-free writes for signal handlers
//!
//! Crash handlers usually want a header ahead of the frame dump (the signal
//! number, a thread id). `format!` allocates, so integers are formatted into
//! a stack buffer here and written with a single `write(2)` call.

#![allow(unsafe_code)] // write(2)

use std::ffi::c_int;

/// Enough for `i64::MIN` in decimal
pub const INT_BUF_LEN: usize = 20;

/// Write `bytes` to `fd` with one `write(2)`
///
/// Like the frame dump, nothing is retried: a short, interrupted or failed
/// write is accepted as is. Returns `true` only if every byte went out.
pub fn write_bytes(fd: c_int, bytes: &[u8]) -> bool {
    if bytes.is_empty() {
        return true;
    }
    raw_write(fd, bytes) == Some(bytes.len())
}

/// Write `n` in decimal to `fd`
pub fn write_int(fd: c_int, n: i64) -> bool {
    let mut buf = [0u8; INT_BUF_LEN];
    write_bytes(fd, format_int(n, &mut buf))
}

/// Format `n` in decimal into the tail of `buf`, returning the used slice
pub fn format_int(n: i64, buf: &mut [u8; INT_BUF_LEN]) -> &[u8] {
    let mut pos = INT_BUF_LEN;
    let mut magnitude = n.unsigned_abs();
    loop {
        pos -= 1;
        // Always < 10
        #[allow(clippy::cast_possible_truncation)]
        let digit = (magnitude % 10) as u8;
        buf[pos] = b'0' + digit;
        magnitude /= 10;
        if magnitude == 0 {
            break;
        }
    }
    if n < 0 {
        pos -= 1;
        buf[pos] = b'-';
    }
    &buf[pos..]
}

#[cfg(unix)]
fn raw_write(fd: c_int, bytes: &[u8]) -> Option<usize> {
    let n = unsafe { libc::write(fd, bytes.as_ptr().cast::<libc::c_void>(), bytes.len()) };
    usize::try_from(n).ok()
}

#[cfg(not(unix))]
fn raw_write(_fd: c_int, _bytes: &[u8]) -> Option<usize> {
    None
}
