//! Newtypes shared by the capture, symbolization and rendering layers

use std::fmt;

/// Width of a rendered address: `0x` plus two hex digits per pointer byte
pub const ADDRESS_WIDTH: usize = 2 + 2 * std::mem::size_of::<usize>();

/// An instruction or symbol address, treated as an opaque integer
///
/// Addresses are never dereferenced by this crate. Distances between them
/// are computed on the integer values, so a symbol table that reports a
/// start above the frame address yields a negative offset instead of a
/// wrapped one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub usize);

impl Address {
    pub const NULL: Address = Address(0);

    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }

    #[must_use]
    pub fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Signed distance `self - origin`, never clamped
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn offset_from(self, origin: Address) -> isize {
        (self.0 as isize).wrapping_sub(origin.0 as isize)
    }
}

impl From<usize> for Address {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl fmt::LowerHex for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Position of a frame in the captured list, innermost frame first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FrameIndex(pub usize);

impl fmt::Display for FrameIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Forward so width/alignment flags apply
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_forward() {
        assert_eq!(Address(0x1010).offset_from(Address(0x1000)), 16);
    }

    #[test]
    fn test_offset_from_negative_is_preserved() {
        assert_eq!(Address(0x1000).offset_from(Address(0x1010)), -16);
    }

    #[test]
    fn test_offset_from_null_origin() {
        assert_eq!(Address(0x40).offset_from(Address::NULL), 0x40);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(Address(0xdead_beef).to_string(), "0xdeadbeef");
        assert_eq!(format!("{:>12}", Address(0x10).to_string()), "        0x10");
    }

    #[test]
    fn test_frame_index_padding() {
        assert_eq!(format!("{:<3}|", FrameIndex(7)), "7  |");
    }
}
