//! Common types shared by the cache model, trace loader and replayer.
//!
//! This module provides the small building blocks every other component uses:
//! 1. **Address Types:** The decoded (set index, tag) pair.
//! 2. **Constants:** Address width and trace-format markers.
//! 3. **Access Kinds:** Load, store, modify and instruction-fetch classification.
//! 4. **Error Handling:** Configuration and trace error types.

/// Decoded address type.
pub mod addr;

/// Constants shared across the simulator.
pub mod constants;

/// Memory access kind definitions.
pub mod data;

/// Error types for configuration and trace input.
pub mod error;

pub use addr::DecodedAddr;
pub use constants::ADDRESS_BITS;
pub use data::AccessKind;
pub use error::{ConfigError, SimError, TraceError};
