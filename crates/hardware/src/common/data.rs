//! Memory access kinds found in a trace.
//!
//! Each data line of a trace names one operation. The replayer only needs to
//! know how many passes an operation makes over its byte span:
//! 1. **Load / Store:** One pass. The simulator does not distinguish reads from
//!    writes for cache-content purposes.
//! 2. **Modify:** A read pass followed by a write pass over the same span.
//! 3. **Instruction:** Instruction fetches are never replayed.

use std::fmt;

/// Type of memory operation carried by a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Instruction fetch (`I`). Filtered out before replay.
    Instruction,
    /// Data load (`L`).
    Load,
    /// Data store (`S`).
    Store,
    /// Data modify (`M`): a load immediately followed by a store.
    Modify,
}

impl AccessKind {
    /// Maps a trace operation letter to an access kind.
    pub const fn from_op(op: char) -> Option<Self> {
        match op {
            'I' => Some(Self::Instruction),
            'L' => Some(Self::Load),
            'S' => Some(Self::Store),
            'M' => Some(Self::Modify),
            _ => None,
        }
    }

    /// The trace operation letter for this kind.
    pub const fn op(self) -> char {
        match self {
            Self::Instruction => 'I',
            Self::Load => 'L',
            Self::Store => 'S',
            Self::Modify => 'M',
        }
    }

    /// Returns `true` if this operation is followed by a write pass.
    #[inline]
    pub const fn has_write_pass(self) -> bool {
        matches!(self, Self::Modify)
    }

    /// Returns `true` for data accesses (everything except instruction fetches).
    #[inline]
    pub const fn is_data(self) -> bool {
        !matches!(self, Self::Instruction)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op())
    }
}
