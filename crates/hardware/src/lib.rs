//! Trace-driven set-associative cache simulator library.
//!
//! This crate models a single-level CPU cache and replays memory traces against it:
//! 1. **Config:** Raw parameters from flags or JSON, validated into an immutable geometry.
//! 2. **Cache:** Flat set/line storage, address decoding, and FIFO/LRU eviction through a
//!    single minimum-stamp rule.
//! 3. **Sim:** Trace parsing and the replayer that expands records into per-line accesses.
//! 4. **Stats:** Hit, miss and eviction counters.
//!
//! ```
//! use csim_core::{Cache, Geometry, Replayer};
//! use csim_core::config::ReplacementPolicy;
//! use csim_core::sim::TraceRecord;
//!
//! let geometry = Geometry::new(1, 1, 16, ReplacementPolicy::Lru).unwrap();
//! let mut replayer = Replayer::new(Cache::new(geometry));
//! let stats = replayer.replay([TraceRecord::load(0x0, 1), TraceRecord::load(0x20, 1)]);
//! assert_eq!(stats.to_string(), "hits:0 misses:2 evictions:1");
//! ```

/// Set-associative cache model and replacement policies.
pub mod cache;
/// Common types (decoded addresses, access kinds, constants, errors).
pub mod common;
/// Simulator configuration (policy enum, raw config, validated geometry).
pub mod config;
/// Trace loader and replayer.
pub mod sim;
/// Hit, miss and eviction counters.
pub mod stats;

/// Cache model; construct with `Cache::new(geometry)`.
pub use crate::cache::{AccessOutcome, Cache, CacheModel};
/// Root configuration type and validated geometry.
pub use crate::config::{Config, Geometry};
/// Drives a cache from trace records.
pub use crate::sim::Replayer;
/// Final counters of a run.
pub use crate::stats::CacheStats;
