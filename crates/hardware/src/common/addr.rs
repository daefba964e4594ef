//! Decoded cache address type.
//!
//! A 64-bit address is split into three fields by the cache geometry:
//!
//! ```text
//!  63                 offset+index   offset        0
//! +-----------------------+------------+-----------+
//! |          tag          | set index  |  offset   |
//! +-----------------------+------------+-----------+
//! ```
//!
//! The offset selects a byte within a line and is not modelled beyond line
//! boundary detection, so only the set index and tag are kept.

use std::fmt;

/// An address after decomposition into set index and tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecodedAddr {
    /// Which set the address maps to (`0..sets`).
    pub set_index: usize,
    /// The high-order bits identifying the memory block within that set.
    pub tag: u64,
}

impl DecodedAddr {
    /// Creates a decoded address from its raw fields.
    #[inline(always)]
    pub const fn new(set_index: usize, tag: u64) -> Self {
        Self { set_index, tag }
    }
}

impl fmt::Display for DecodedAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "set={} tag={:#x}", self.set_index, self.tag)
    }
}
