//! Crash handler demo - dumps the stack from inside a SIGSEGV handler
//!
//! Installs a handler that writes a header and the raw frames to stderr
//! using only async-signal-safe calls, then dereferences a null pointer.
//!
//! Run with: cargo run --example segv-handler

#![allow(unsafe_code)]

use crashtrace::{dumper, safe_write};
use std::ffi::c_int;

const STDERR: c_int = libc::STDERR_FILENO;

extern "C" fn on_fatal_signal(sig: c_int) {
    safe_write::write_bytes(STDERR, b"\n*** fatal signal ");
    safe_write::write_int(STDERR, i64::from(sig));
    safe_write::write_bytes(STDERR, b" ***\n");
    dumper::dump_to_fd(STDERR);

    // Restore the default action and re-raise so the exit status is right
    unsafe {
        libc::signal(sig, libc::SIG_DFL);
        libc::raise(sig);
    }
}

fn install() {
    for sig in [libc::SIGSEGV, libc::SIGBUS, libc::SIGILL, libc::SIGABRT] {
        unsafe {
            let mut action: libc::sigaction = std::mem::zeroed();
            action.sa_sigaction = on_fatal_signal as *const () as usize;
            libc::sigemptyset(&mut action.sa_mask);
            libc::sigaction(sig, &action, std::ptr::null_mut());
        }
    }
}

#[inline(never)]
fn crash(depth: u32) {
    if depth == 0 {
        let ptr: *const u8 = std::hint::black_box(std::ptr::null());
        let value = unsafe { std::ptr::read_volatile(ptr) };
        println!("unreachable: {value}");
        return;
    }
    crash(depth - 1);
    std::hint::black_box(());
}

fn main() {
    // Outside signal context, so the unwinder can load freely
    dumper::prime();
    install();

    println!("Trace before the crash:");
    print!("{}", crashtrace::capture_trace(0));

    println!("\nCrashing 3 frames down...");
    crash(3);
}
