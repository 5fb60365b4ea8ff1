//! # Symbol Resolution
//!
//! Turns raw instruction addresses into something a human can read.
//!
//! ## Resolution sources
//!
//! - **`resolver`**: the [`Resolve`] seam and [`DynamicLoader`], which asks
//!   the dynamic loader (`dladdr`) for the module and the nearest preceding
//!   exported symbol. This is the same table the platform's own
//!   `backtrace_symbols` consults, so both lines of a rendered frame agree.
//! - **`regions`**: a [`RegionTable`] parsed from `/proc/self/maps`. It can
//!   carry symbol lists per region and resolve against them, which makes an
//!   address space fully describable in memory.
//! - **`demangle`**: decodes Rust symbol names (legacy `_ZN...E` and v0
//!   `_R...`) with `rustc-demangle`. Names it does not recognise pass
//!   through unchanged.
//!
//! ## Offsets
//!
//! The offset of a frame is `frame address - symbol start`, computed as a
//! signed distance between two opaque integers. A symbol table that reports
//! a start above the frame produces a negative offset, which is rendered as
//! is.
//!
//! ## Limitations
//!
//! - `dladdr` only sees dynamic symbols. Executables built without
//!   `-rdynamic` resolve to their module with no symbol name.
//! - No DWARF, so no file or line information.

pub mod demangle;
pub mod regions;
pub mod resolver;

pub use demangle::demangle_symbol;
pub use regions::{MemoryRange, Region, RegionTable};
pub use resolver::{DynamicLoader, Resolve, SymbolInfo};
