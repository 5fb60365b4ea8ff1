//! # crashtrace - call stack capture for crash reports
//!
//! crashtrace captures the calling thread's stack and renders it for
//! diagnostics. It is meant to be called from a host's crash or signal
//! handlers; deciding when to call it and where the output ends up is left
//! to the host.
//!
//! ## Two entry points
//!
//! ```text
//!                    ┌──────────────────────┐
//!                    │   FrameBuffer (128)  │  execinfo backtrace(),
//!                    │  innermost first     │  stack-allocated
//!                    └──────────┬───────────┘
//!              ┌────────────────┴────────────────┐
//!              ▼                                 ▼
//!   ┌─────────────────────┐           ┌─────────────────────┐
//!   │    Stack Walker     │           │    Safe Dumper      │
//!   │  capture_trace()    │           │  dump_to_fd()       │
//!   │  dladdr + demangle  │           │  backtrace_symbols  │
//!   │  -> String          │           │  _fd -> write(2)    │
//!   │  (allocates)        │           │  (signal-safe)      │
//!   └─────────────────────┘           └─────────────────────┘
//! ```
//!
//! - [`walker::capture_trace`] resolves each frame through the dynamic
//!   loader, demangles the symbol and renders index, address, name and
//!   offset, followed by the platform's own line for the frame. It may
//!   allocate and log, so it belongs on ordinary code paths.
//! - [`dumper::dump_to_fd`] writes the platform's line for each frame
//!   straight to a descriptor. It never allocates or locks and can run
//!   inside a signal handler, provided [`dumper::prime`] ran at startup.
//!
//! Both capture at most [`capture::MAX_FRAMES`] frames. Deeper stacks keep
//! the innermost frames and the walker appends `[truncated]`.
//!
//! ## Module Structure
//!
//! - [`capture`]: fixed-capacity frame list and the platform's symbol lines
//! - [`symbolization`]: `dladdr` resolver, region table, demangling
//! - [`walker`]: the Stack Walker and its [`walker::TraceReport`]
//! - [`dumper`]: the Safe Dumper
//! - [`safe_write`]: allocation-free `write(2)` helpers for handler headers
//! - [`cli`]: command-line arguments for the `crashtrace` binary
//! - [`domain`]: core types (`Address`, `FrameIndex`) and errors
//!
//! ## Typical Usage
//!
//! ```rust,ignore
//! // Ordinary path: build a report starting at the caller
//! let trace = crashtrace::capture_trace(crashtrace::walker::OWN_FRAMES);
//! log::error!("fatal error\n{trace}");
//!
//! // Signal handler: dump straight to stderr
//! extern "C" fn on_fatal(sig: libc::c_int) {
//!     crashtrace::safe_write::write_bytes(2, b"signal ");
//!     crashtrace::safe_write::write_int(2, i64::from(sig));
//!     crashtrace::safe_write::write_bytes(2, b"\n");
//!     crashtrace::dump_to_fd(2);
//! }
//! ```

pub mod capture;
pub mod cli;
pub mod domain;
pub mod dumper;
pub mod safe_write;
pub mod symbolization;
pub mod walker;

pub use dumper::dump_to_fd;
pub use walker::capture_trace;
