//! Error definitions for configuration and trace handling.
//!
//! The cache model itself cannot fail once it has been built from a validated
//! [`Geometry`](crate::config::Geometry). Everything that can go wrong happens at
//! the edges of a run:
//! 1. **Configuration:** Non-power-of-two geometry, zero associativity, unknown
//!    or missing eviction policy, malformed JSON.
//! 2. **Trace input:** Unreadable trace files and malformed data lines.
//!
//! [`SimError`] wraps both so a driver can propagate either with `?`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a cache geometry from user input.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field that must be a power of two (set count, line size) is not.
    #[error("{field} must be a power of 2 (got {value})")]
    NotPowerOfTwo {
        /// Name of the offending field (`S` or `B`).
        field: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// Associativity must be at least one line per set.
    #[error("K must be a number larger than 0")]
    ZeroWays,

    /// The eviction policy name is not one of the supported policies.
    #[error("Policy must be FIFO or LRU (got '{0}')")]
    UnknownPolicy(String),

    /// A required field was supplied neither on the command line nor in a config file.
    #[error("missing required parameter {0}")]
    Missing(&'static str),

    /// `sets * ways` does not fit in the host address space.
    #[error("cache of {sets} sets x {ways} ways is too large to allocate")]
    TooLarge {
        /// Requested set count.
        sets: usize,
        /// Requested associativity.
        ways: usize,
    },

    /// A JSON configuration document could not be deserialized.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Errors raised while reading or tokenizing a trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// The trace source could not be opened or read.
    #[error("{}: {source}", path.display())]
    Io {
        /// Path of the trace (or `<reader>` for in-memory sources).
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A data-access line did not match ` <op> <hex-addr>,<size>`.
    #[error("line {line}: {reason}")]
    Malformed {
        /// 1-based line number within the trace.
        line: usize,
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// The access span runs past the top of the 64-bit address space.
    #[error("line {line}: access of {size} bytes at {address:#x} wraps the address space")]
    SpanOverflow {
        /// 1-based line number within the trace.
        line: usize,
        /// Start address of the access.
        address: u64,
        /// Access size in bytes.
        size: u32,
    },
}

/// Top-level error for a complete simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Geometry or policy was rejected before the cache was built.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The trace could not be read or parsed.
    #[error(transparent)]
    Trace(#[from] TraceError),
}
