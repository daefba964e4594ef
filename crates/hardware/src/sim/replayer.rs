//! Trace Replayer: drives a cache with a stream of trace records.
//!
//! The replayer owns the logical clock used for recency stamps. Each record is
//! expanded into one access per distinct cache line it touches; the clock advances
//! by one after every access, so the stamp of access N is strictly less than the
//! stamp of access N+1.
//!
//! A pass walks the record's bytes in increasing address order and only calls the
//! cache when a per-byte line key changes. The read pass keys on the line number
//! masked to `log2(B)` bits, the write pass of a modify keys on it masked to
//! `log2(S)` bits. Both are constant within a line, so a span inside one line is a
//! single access, and both assume the span does not wrap.

use std::fmt;

use tracing::{info, trace};

use super::loader::TraceRecord;
use crate::cache::{AccessOutcome, CacheModel};
use crate::config::Geometry;
use crate::stats::CacheStats;

/// Accesses generated by one record, in issue order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    /// One entry per distinct-line access.
    pub accesses: Vec<AccessOutcome>,
}

impl RecordOutcome {
    /// Number of cache accesses the record produced.
    pub fn len(&self) -> usize {
        self.accesses.len()
    }

    /// Returns `true` if the record produced no accesses.
    pub fn is_empty(&self) -> bool {
        self.accesses.is_empty()
    }
}

impl fmt::Display for RecordOutcome {
    /// Formats as space-separated outcomes, e.g. `miss eviction hit`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, outcome) in self.accesses.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{outcome}")?;
        }
        Ok(())
    }
}

/// Which mask a pass uses to detect line changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pass {
    Read,
    Write,
}

/// Replays trace records against a [`CacheModel`].
#[derive(Debug)]
pub struct Replayer<C> {
    cache: C,
    geometry: Geometry,
    clock: u64,
    records: u64,
}

impl<C: CacheModel> Replayer<C> {
    /// Creates a replayer with the clock at zero.
    pub fn new(cache: C) -> Self {
        let geometry = cache.geometry();
        Self {
            cache,
            geometry,
            clock: 0,
            records: 0,
        }
    }

    /// Replays one record and returns the outcome of every access it caused.
    ///
    /// Loads and stores make one pass over `address .. address + size`, modifies make a
    /// read pass and then a write pass. Zero-size records and instruction fetches make
    /// no accesses.
    pub fn replay_record(&mut self, record: &TraceRecord) -> RecordOutcome {
        let mut outcome = RecordOutcome::default();
        self.records += 1;
        if !record.kind.is_data() {
            return outcome;
        }

        self.pass(record, Pass::Read, &mut outcome.accesses);
        if record.kind.has_write_pass() {
            self.pass(record, Pass::Write, &mut outcome.accesses);
        }
        trace!(%record, %outcome, "replayed record");
        outcome
    }

    /// Replays every record and returns the final counters.
    pub fn replay<I>(&mut self, records: I) -> CacheStats
    where
        I: IntoIterator<Item = TraceRecord>,
    {
        for record in records {
            let _ = self.replay_record(&record);
        }
        self.finish()
    }

    /// Replays a fallible record stream, stopping at the first error.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `records`. Records before it have already
    /// been applied to the cache.
    pub fn run<I, E>(&mut self, records: I) -> Result<CacheStats, E>
    where
        I: IntoIterator<Item = Result<TraceRecord, E>>,
    {
        self.run_with(records, |_, _| {})
    }

    /// Like [`Replayer::run`], calling `on_record` after each record is replayed.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `records`.
    pub fn run_with<I, E, F>(&mut self, records: I, mut on_record: F) -> Result<CacheStats, E>
    where
        I: IntoIterator<Item = Result<TraceRecord, E>>,
        F: FnMut(&TraceRecord, &RecordOutcome),
    {
        for record in records {
            let record = record?;
            let outcome = self.replay_record(&record);
            on_record(&record, &outcome);
        }
        Ok(self.finish())
    }

    /// Counters accumulated by the cache so far.
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Current logical-clock value (equal to the number of accesses issued).
    pub const fn clock(&self) -> u64 {
        self.clock
    }

    /// Number of records replayed, including ones that produced no access.
    pub const fn records(&self) -> u64 {
        self.records
    }

    /// The driven cache.
    pub const fn cache(&self) -> &C {
        &self.cache
    }

    /// Consumes the replayer and returns the cache.
    pub fn into_cache(self) -> C {
        self.cache
    }

    fn finish(&self) -> CacheStats {
        let stats = self.cache.stats();
        info!(
            records = self.records,
            accesses = self.clock,
            %stats,
            "trace replay finished"
        );
        stats
    }

    /// Issues one access per line-key change across the record's span.
    ///
    /// Every byte of a line shares the line's key, so stepping line by line visits the
    /// same key changes as stepping byte by byte. With a non-zero mask adjacent lines
    /// always differ in their low key bit, so every line is accessed. A zero mask gives
    /// every byte the same key and only the first line is accessed. A span that would
    /// wrap is cut at `u64::MAX`.
    fn pass(&mut self, record: &TraceRecord, pass: Pass, out: &mut Vec<AccessOutcome>) {
        if record.size == 0 {
            return;
        }
        let offset_bits = self.geometry.offset_bits();
        let key_mask = match pass {
            Pass::Read => self.geometry.offset_mask(),
            Pass::Write => self.geometry.set_mask(),
        };
        let first_line = record.address >> offset_bits;
        let last_line = if key_mask == 0 {
            first_line
        } else {
            let last_byte = record
                .address
                .saturating_add(u64::from(record.size) - 1);
            last_byte >> offset_bits
        };

        for line in first_line..=last_line {
            let addr = if line == first_line {
                record.address
            } else {
                line << offset_bits
            };
            out.push(self.cache.access(addr, self.clock));
            self.clock += 1;
        }
    }
}
