//! Set-Associative Cache Model.
//!
//! This module implements the storage and access algorithm of a set-associative
//! cache. Lines live in one flat vector indexed by `set * ways + way`, allocated
//! once from a validated [`Geometry`] and never resized.
//!
//! An access decodes the address, scans the addressed set, and ends in exactly one
//! of three outcomes:
//! 1. **Hit:** a valid line holds the tag. LRU refreshes its stamp.
//! 2. **Miss:** the set has a free line. The tag is installed in the first free way.
//! 3. **Eviction:** the set is full. The line with the minimum stamp is replaced.
//!
//! No memory contents, timing or dirty state are modelled.

/// Stamp refresh and victim selection shared by FIFO and LRU.
pub mod policies;

use std::fmt;

use tracing::{debug, trace};

use crate::common::DecodedAddr;
use crate::config::Geometry;
use crate::stats::CacheStats;

/// Cache line entry containing validity, tag and recency stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    /// Whether the slot holds a block.
    pub valid: bool,
    /// Tag of the block in this slot; meaningful only when `valid`.
    pub tag: u64,
    /// Logical-clock value at the last fill (FIFO) or fill-or-hit (LRU).
    pub stamp: u64,
}

/// Result of a single cache access.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessOutcome {
    /// The line was resident.
    Hit,
    /// The line was installed into a free way.
    Miss,
    /// The line was installed over a valid victim.
    Eviction,
}

impl AccessOutcome {
    /// Returns `true` if a valid line was displaced.
    #[inline]
    pub const fn is_eviction(self) -> bool {
        matches!(self, Self::Eviction)
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Hit => "hit",
            Self::Miss => "miss",
            Self::Eviction => "miss eviction",
        })
    }
}

/// Interface between the trace replayer and a cache.
///
/// The replayer owns the logical clock and passes its current value as `now`;
/// the cache records the outcome in its own counters.
pub trait CacheModel {
    /// Performs one access to the line containing `addr`, stamping with `now`.
    fn access(&mut self, addr: u64, now: u64) -> AccessOutcome;

    /// The geometry the cache was built with.
    fn geometry(&self) -> Geometry;

    /// Counters accumulated so far.
    fn stats(&self) -> CacheStats;
}

/// Set-associative cache with FIFO or LRU eviction.
#[derive(Clone, Debug)]
pub struct Cache {
    geometry: Geometry,
    lines: Vec<CacheLine>,
    stats: CacheStats,
}

impl Cache {
    /// Allocates a cache with every line invalid.
    pub fn new(geometry: Geometry) -> Self {
        debug!(
            %geometry,
            lines = geometry.total_lines(),
            tag_bits = geometry.tag_bits(),
            "allocated cache"
        );
        Self {
            geometry,
            lines: vec![CacheLine::default(); geometry.total_lines()],
            stats: CacheStats::default(),
        }
    }

    /// Accesses the line containing `addr`.
    ///
    /// Scans the addressed set for a valid line with a matching tag, stopping at the
    /// first match. On a miss the tag goes into the first invalid way, or over the
    /// minimum-stamp way when the set is full. Exactly one line and one or two
    /// counters change.
    ///
    /// # Arguments
    ///
    /// * `addr` - Any byte address inside the line.
    /// * `now` - Current logical-clock value; strictly greater than any earlier `now`.
    pub fn access(&mut self, addr: u64, now: u64) -> AccessOutcome {
        let DecodedAddr { set_index, tag } = self.geometry.decode(addr);
        let policy = self.geometry.policy();
        let ways = self.geometry.ways();
        let base = set_index * ways;
        let set = &mut self.lines[base..base + ways];

        let mut free_way = None;
        for (way, line) in set.iter_mut().enumerate() {
            if !line.valid {
                if free_way.is_none() {
                    free_way = Some(way);
                }
                continue;
            }
            if line.tag == tag {
                policies::touch(policy, line, now);
                self.stats.record(AccessOutcome::Hit);
                trace!(addr, set_index, way, "hit");
                return AccessOutcome::Hit;
            }
        }

        let (way, outcome) = match free_way {
            Some(way) => (way, AccessOutcome::Miss),
            None => (policies::victim_way(set), AccessOutcome::Eviction),
        };

        let line = &mut set[way];
        if outcome.is_eviction() {
            trace!(addr, set_index, way, victim_tag = line.tag, "eviction");
        } else {
            trace!(addr, set_index, way, "miss");
        }
        *line = CacheLine {
            valid: true,
            tag,
            stamp: now,
        };
        self.stats.record(outcome);
        outcome
    }

    /// Checks whether the line containing `addr` is resident, without side effects.
    pub fn contains(&self, addr: u64) -> bool {
        let DecodedAddr { set_index, tag } = self.geometry.decode(addr);
        self.set(set_index)
            .is_some_and(|set| set.iter().any(|line| line.valid && line.tag == tag))
    }

    /// Returns the lines of one set, or `None` if `set_index` is out of range.
    pub fn set(&self, set_index: usize) -> Option<&[CacheLine]> {
        if set_index >= self.geometry.sets() {
            return None;
        }
        let ways = self.geometry.ways();
        let base = set_index * ways;
        self.lines.get(base..base + ways)
    }

    /// Number of valid lines in a set (zero for an out-of-range index).
    pub fn valid_lines(&self, set_index: usize) -> usize {
        self.set(set_index)
            .map_or(0, |set| set.iter().filter(|line| line.valid).count())
    }

    /// The geometry this cache was built with.
    #[inline]
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Counters accumulated so far.
    #[inline]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl CacheModel for Cache {
    #[inline]
    fn access(&mut self, addr: u64, now: u64) -> AccessOutcome {
        Self::access(self, addr, now)
    }

    fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn stats(&self) -> CacheStats {
        self.stats
    }
}
