//! Simulation statistics collection and reporting.
//!
//! This module tracks the three counters a run produces:
//! 1. **Hits:** Accesses whose line was already resident.
//! 2. **Misses:** Accesses that had to fill a line.
//! 3. **Evictions:** Misses that displaced a valid line.
//!
//! Counters only grow. `hits + misses` equals the number of distinct-line accesses
//! processed and `evictions <= misses` always holds.

use std::fmt;
use std::ops::AddAssign;

use serde::Serialize;

use crate::cache::AccessOutcome;

/// Hit, miss and eviction counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct CacheStats {
    /// Accesses that found their line resident.
    pub hits: u64,
    /// Accesses that did not.
    pub misses: u64,
    /// Misses that replaced a valid line.
    pub evictions: u64,
}

impl CacheStats {
    /// Creates a counter set with explicit values.
    pub const fn new(hits: u64, misses: u64, evictions: u64) -> Self {
        Self {
            hits,
            misses,
            evictions,
        }
    }

    /// Counts one access outcome.
    #[inline]
    pub fn record(&mut self, outcome: AccessOutcome) {
        match outcome {
            AccessOutcome::Hit => self.hits += 1,
            AccessOutcome::Miss => self.misses += 1,
            AccessOutcome::Eviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// Total number of accesses counted.
    #[inline]
    pub const fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit, or `0.0` before any access.
    pub fn hit_rate(&self) -> f64 {
        let total = self.accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl AddAssign for CacheStats {
    fn add_assign(&mut self, rhs: Self) {
        self.hits += rhs.hits;
        self.misses += rhs.misses;
        self.evictions += rhs.evictions;
    }
}

impl fmt::Display for CacheStats {
    /// Formats the counters as the canonical summary line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}
