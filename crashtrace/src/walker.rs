//! Stack Walker: capture the current call stack and render it as text
//!
//! Each captured frame becomes a [`FrameBlock`]: a resolved line with the
//! frame index, address, symbol name and offset (or just index and address
//! when nothing covers the frame), followed by the platform's own one-line
//! description of the same frame. This path allocates freely and must not be
//! used from a signal handler; see [`crate::dumper`] for that.

use std::fmt;

use log::debug;

use crate::capture::{FrameBuffer, PlatformSymbols};
use crate::domain::types::ADDRESS_WIDTH;
use crate::domain::{Address, FrameIndex};
use crate::symbolization::{demangle_symbol, DynamicLoader, Resolve};

/// Appended when the stack was deeper than the capture capacity
pub const TRUNCATION_MARKER: &str = "[truncated]";

/// Rendered name when the loader attributes a module but no symbol
pub const UNKNOWN_SYMBOL: &str = "<unknown>";

/// Frames [`capture_trace`] puts on the stack below its caller:
/// `FrameBuffer::capture`, `StackWalker::walk` and `capture_trace` itself
pub const OWN_FRAMES: usize = 3;

/// Capture the calling thread's stack and render it
///
/// The first `skip` frames are omitted. Frames 0 to `OWN_FRAMES - 1` belong
/// to this crate in every build profile, so `capture_trace(OWN_FRAMES)`
/// starts at the caller. Never fails: frames that cannot be resolved
/// degrade to index and address.
#[inline(never)]
#[must_use]
pub fn capture_trace(skip: usize) -> String {
    StackWalker::new().walk(skip).to_string()
}

/// Symbol part of a resolved frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbol {
    pub module: String,
    /// Demangled name, or the raw one if it could not be demangled
    pub name: String,
    /// Signed distance from the symbol start to the frame address
    pub offset: isize,
}

/// One frame of a [`TraceReport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBlock {
    pub index: FrameIndex,
    pub address: Address,
    pub symbol: Option<ResolvedSymbol>,
    /// The platform's default description, verbatim
    pub platform_line: String,
}

impl fmt::Display for FrameBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<3} {:>#width$x}", self.index, self.address, width = ADDRESS_WIDTH)?;
        if let Some(ref symbol) = self.symbol {
            write!(f, " {} + {}", symbol.name, symbol.offset)?;
        }
        writeln!(f)?;
        writeln!(f, "{}", self.platform_line)
    }
}

/// A rendered stack trace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceReport {
    blocks: Vec<FrameBlock>,
    truncated: bool,
}

impl TraceReport {
    #[must_use]
    pub fn blocks(&self) -> &[FrameBlock] {
        &self.blocks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The stack was at least as deep as the capture capacity
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl fmt::Display for TraceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        if self.truncated {
            writeln!(f, "{TRUNCATION_MARKER}")?;
        }
        Ok(())
    }
}

/// Walks the stack and resolves frames through `R`
#[derive(Debug, Clone, Default)]
pub struct StackWalker<R = DynamicLoader> {
    resolver: R,
}

impl StackWalker<DynamicLoader> {
    #[must_use]
    pub fn new() -> Self {
        Self { resolver: DynamicLoader }
    }
}

impl<R: Resolve> StackWalker<R> {
    #[must_use]
    pub fn with_resolver(resolver: R) -> Self {
        Self { resolver }
    }

    /// Capture the calling thread's stack and render it, omitting `skip` frames
    ///
    /// Frame 0 is `FrameBuffer::capture`, frame 1 is this function.
    #[inline(never)]
    pub fn walk(&self, skip: usize) -> TraceReport {
        let frames = FrameBuffer::capture();
        debug!("Captured {} frames (truncated: {})", frames.len(), frames.is_truncated());
        self.render(&frames, skip)
    }

    /// Render an already captured frame list, omitting the first `skip` frames
    pub fn render(&self, frames: &FrameBuffer, skip: usize) -> TraceReport {
        let platform = PlatformSymbols::for_frames(frames);

        let blocks = frames
            .addresses()
            .enumerate()
            .skip(skip)
            .map(|(i, address)| FrameBlock {
                index: FrameIndex(i),
                address,
                symbol: self.resolve_symbol(address),
                platform_line: platform
                    .line(i)
                    .map_or_else(|| format!("[{address}]"), std::borrow::Cow::into_owned),
            })
            .collect::<Vec<_>>();

        let unresolved = blocks.iter().filter(|b| b.symbol.is_none()).count();
        if unresolved > 0 {
            debug!("{unresolved} of {} frames could not be attributed to a module", blocks.len());
        }

        TraceReport { blocks, truncated: frames.is_truncated() }
    }

    fn resolve_symbol(&self, address: Address) -> Option<ResolvedSymbol> {
        let info = self.resolver.resolve(address)?;
        let name = info
            .name
            .as_deref()
            .map_or_else(|| UNKNOWN_SYMBOL.to_string(), |raw| demangle_symbol(raw).into_owned());
        Some(ResolvedSymbol { offset: info.offset_of(address), module: info.module, name })
    }
}
