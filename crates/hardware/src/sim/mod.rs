//! Trace loading and replay.
//!
//! Provides the trace parser and the replayer that feeds parsed records into a
//! cache, plus [`simulate_file`] which wires the two together for a whole run.

use std::path::Path;

/// Trace line parsing and file reading.
pub mod loader;
/// Replays parsed records against a cache.
pub mod replayer;

pub use loader::{TraceReader, TraceRecord, parse_line};
pub use replayer::{RecordOutcome, Replayer};

use crate::cache::Cache;
use crate::common::SimError;
use crate::config::Geometry;
use crate::stats::CacheStats;

/// Builds a cache from `geometry` and replays the trace at `path` through it.
///
/// # Errors
///
/// Returns [`SimError::Trace`] if the file cannot be opened or contains a malformed
/// data line.
pub fn simulate_file(geometry: Geometry, path: impl AsRef<Path>) -> Result<CacheStats, SimError> {
    let reader = TraceReader::open(path)?;
    let mut replayer = Replayer::new(Cache::new(geometry));
    Ok(replayer.run(reader)?)
}
