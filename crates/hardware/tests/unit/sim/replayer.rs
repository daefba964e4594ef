//! Replayer Unit Tests.
//!
//! The mocked cache records every `access(addr, now)` call so these tests pin down
//! how records are expanded into accesses: how many, at which address, and with
//! which clock stamp. The last section replays through a real `Cache` to check the
//! line-key behaviour of the read and write passes.

use csim_core::cache::{AccessOutcome, Cache};
use csim_core::common::TraceError;
use csim_core::sim::{RecordOutcome, Replayer, TraceRecord};
use mockall::Sequence;
use mockall::predicate::eq;
use pretty_assertions::assert_eq;

use crate::common::lru;
use crate::common::mocks::mock_cache;

use AccessOutcome::{Eviction, Hit, Miss};

// ══════════════════════════════════════════════════════════
// 1. Access expansion (mocked cache)
// ══════════════════════════════════════════════════════════

#[test]
fn span_inside_one_line_is_one_access() {
    let mut cache = mock_cache(lru(4, 1, 16));
    cache
        .expect_access()
        .with(eq(0x20), eq(0))
        .times(1)
        .return_const(Miss);

    let mut replayer = Replayer::new(cache);
    let outcome = replayer.replay_record(&TraceRecord::load(0x20, 16));

    assert_eq!(outcome.accesses, [Miss]);
    assert_eq!(replayer.clock(), 1);
}

#[test]
fn span_crossing_a_line_boundary_accesses_each_line() {
    let mut cache = mock_cache(lru(4, 1, 16));
    let mut seq = Sequence::new();
    cache
        .expect_access()
        .with(eq(0x1c), eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(Miss);
    cache
        .expect_access()
        .with(eq(0x20), eq(1))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(Miss);

    let mut replayer = Replayer::new(cache);
    let outcome = replayer.replay_record(&TraceRecord::load(0x1c, 8));

    assert_eq!(outcome.len(), 2);
    assert_eq!(replayer.clock(), 2);
}

#[test]
fn store_is_a_single_pass() {
    let mut cache = mock_cache(lru(4, 1, 16));
    cache
        .expect_access()
        .with(eq(0x40), eq(0))
        .times(1)
        .return_const(Miss);

    let mut replayer = Replayer::new(cache);
    let outcome = replayer.replay_record(&TraceRecord::store(0x40, 4));
    assert_eq!(outcome.accesses, [Miss]);
}

#[test]
fn modify_issues_read_then_write_pass() {
    let mut cache = mock_cache(lru(4, 1, 16));
    let mut seq = Sequence::new();
    cache
        .expect_access()
        .with(eq(0x40), eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(Miss);
    cache
        .expect_access()
        .with(eq(0x40), eq(1))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(Hit);

    let mut replayer = Replayer::new(cache);
    let outcome = replayer.replay_record(&TraceRecord::modify(0x40, 4));

    assert_eq!(outcome.accesses, [Miss, Hit]);
    assert_eq!(outcome.to_string(), "miss hit");
}

#[test]
fn zero_size_record_makes_no_access() {
    let mut cache = mock_cache(lru(4, 1, 16));
    cache.expect_access().never();

    let mut replayer = Replayer::new(cache);
    for record in [
        TraceRecord::load(0x10, 0),
        TraceRecord::store(0x10, 0),
        TraceRecord::modify(0x10, 0),
    ] {
        assert!(replayer.replay_record(&record).is_empty());
    }
    assert_eq!(replayer.clock(), 0);
    assert_eq!(replayer.records(), 3);
}

#[test]
fn instruction_record_is_ignored() {
    use csim_core::common::AccessKind;

    let mut cache = mock_cache(lru(4, 1, 16));
    cache.expect_access().never();

    let mut replayer = Replayer::new(cache);
    let record = TraceRecord::new(AccessKind::Instruction, 0x0400_d7d4, 8);
    assert!(replayer.replay_record(&record).is_empty());
    assert_eq!(replayer.clock(), 0);
}

#[test]
fn clock_continues_across_records() {
    let mut cache = mock_cache(lru(4, 1, 16));
    let mut seq = Sequence::new();
    for (addr, now) in [(0x00, 0), (0x10, 1), (0x20, 2)] {
        cache
            .expect_access()
            .with(eq(addr), eq(now))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Miss);
    }

    let mut replayer = Replayer::new(cache);
    let _ = replayer.replay([
        TraceRecord::load(0x00, 1),
        TraceRecord::load(0x10, 1),
        TraceRecord::load(0x20, 1),
    ]);
    assert_eq!(replayer.clock(), 3);
}

#[test]
fn one_byte_lines_read_pass_is_a_single_access() {
    // With B = 1 the read key is masked to zero bits, so the whole span is one access.
    let mut cache = mock_cache(lru(4, 1, 1));
    cache
        .expect_access()
        .with(eq(0x0), eq(0))
        .times(1)
        .return_const(Miss);

    let mut replayer = Replayer::new(cache);
    assert_eq!(replayer.replay_record(&TraceRecord::load(0, 4)).len(), 1);
}

// ══════════════════════════════════════════════════════════
// 2. Fallible streams
// ══════════════════════════════════════════════════════════

#[test]
fn run_stops_at_first_error() {
    let mut cache = mock_cache(lru(4, 1, 16));
    cache
        .expect_access()
        .with(eq(0x10), eq(0))
        .times(1)
        .return_const(Miss);

    let records = vec![
        Ok(TraceRecord::load(0x10, 1)),
        Err(TraceError::Malformed {
            line: 2,
            reason: "missing size".to_owned(),
        }),
        Ok(TraceRecord::load(0x20, 1)),
    ];

    let mut replayer = Replayer::new(cache);
    let err = replayer.run(records).unwrap_err();
    assert!(matches!(err, TraceError::Malformed { line: 2, .. }));
    assert_eq!(replayer.records(), 1);
}

#[test]
fn run_with_reports_every_record() {
    let mut replayer = Replayer::new(Cache::new(lru(1, 1, 16)));
    let records = [
        TraceRecord::load(0x00, 1),
        TraceRecord::load(0x20, 1),
        TraceRecord::modify(0x20, 1),
    ];

    let mut seen: Vec<(TraceRecord, RecordOutcome)> = Vec::new();
    let stats = replayer
        .run_with(records.iter().copied().map(Ok::<_, TraceError>), |record, outcome| {
            seen.push((*record, outcome.clone()));
        })
        .unwrap();

    let lines: Vec<String> = seen
        .iter()
        .map(|(record, outcome)| format!("{record} {outcome}"))
        .collect();
    assert_eq!(lines, ["L 0,1 miss", "L 20,1 miss eviction", "M 20,1 hit hit"]);
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 2);
    assert_eq!(stats.evictions, 1);
}

// ══════════════════════════════════════════════════════════
// 3. Line keys (real cache)
// ══════════════════════════════════════════════════════════

#[test]
fn write_pass_keys_on_set_bits() {
    // One set: the write pass key is always zero, so a two-line modify writes only
    // its first line.
    let mut replayer = Replayer::new(Cache::new(lru(1, 4, 16)));
    let outcome = replayer.replay_record(&TraceRecord::modify(0, 32));
    assert_eq!(outcome.accesses, [Miss, Miss, Hit]);
}

#[test]
fn read_pass_covers_every_line_of_a_long_span() {
    let mut replayer = Replayer::new(Cache::new(lru(4, 1, 16)));
    let outcome = replayer.replay_record(&TraceRecord::load(0x00, 64));
    assert_eq!(outcome.accesses, [Miss; 4]);

    let outcome = replayer.replay_record(&TraceRecord::load(0x40, 16));
    assert_eq!(outcome.accesses, [Eviction]);
}

#[test]
fn into_cache_returns_driven_cache() {
    let mut replayer = Replayer::new(Cache::new(lru(4, 2, 16)));
    let _ = replayer.replay([TraceRecord::load(0x30, 1)]);
    let cache = replayer.into_cache();
    assert!(cache.contains(0x30));
    assert_eq!(cache.stats().misses, 1);
}

#[test]
fn zero_key_mask_issues_one_access_for_a_maximal_span() {
    // S = 1 and B = 1 zero both masks: each pass of a 4 GiB modify is one access.
    let mut cache = mock_cache(lru(1, 1, 1));
    let mut seq = Sequence::new();
    cache
        .expect_access()
        .with(eq(0x1000), eq(0))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(Miss);
    cache
        .expect_access()
        .with(eq(0x1000), eq(1))
        .times(1)
        .in_sequence(&mut seq)
        .return_const(Hit);

    let mut replayer = Replayer::new(cache);
    let outcome = replayer.replay_record(&TraceRecord::modify(0x1000, u32::MAX));
    assert_eq!(outcome.accesses, [Miss, Hit]);
    assert_eq!(replayer.clock(), 2);
}
