//! Global Simulator Constants.
//!
//! This module defines constants shared by the decoder, trace loader and replayer:
//! 1. **Address Constants:** Width of a simulated address.
//! 2. **Trace Constants:** Markers that distinguish data accesses from instruction fetches.

/// Width of a simulated address in bits.
///
/// `tag_bits = ADDRESS_BITS - index_bits - offset_bits`.
pub const ADDRESS_BITS: u32 = 64;

/// Leading character of a trace line that describes a data access.
///
/// Instruction-fetch lines start in column zero and are skipped.
pub const DATA_ACCESS_MARKER: char = ' ';

/// Separator between the address and size fields of a trace line.
pub const SIZE_SEPARATOR: char = ',';
