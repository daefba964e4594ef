//! Property tests for the cache model and replayer.
//!
//! Random geometries and small address ranges (to force conflicts) check the
//! invariants that must hold for every access sequence:
//! - no set ever holds more than `ways` valid lines, and valid tags within a set
//!   are distinct;
//! - `hits + misses` equals the number of accesses and `evictions <= misses`;
//! - replaying the same trace twice gives identical counters.

use std::collections::HashSet;

use csim_core::cache::{AccessOutcome, Cache};
use csim_core::common::AccessKind;
use csim_core::config::{Geometry, ReplacementPolicy};
use csim_core::sim::{Replayer, TraceRecord};
use proptest::prelude::*;

fn geometry_strategy() -> impl Strategy<Value = Geometry> {
    (0u32..4, 1usize..5, 0u32..6, any::<bool>()).prop_map(|(s, ways, b, is_lru)| {
        let policy = if is_lru {
            ReplacementPolicy::Lru
        } else {
            ReplacementPolicy::Fifo
        };
        Geometry::new(1 << s, ways, 1 << b, policy).unwrap()
    })
}

fn record_strategy() -> impl Strategy<Value = TraceRecord> {
    (
        prop_oneof![
            Just(AccessKind::Load),
            Just(AccessKind::Store),
            Just(AccessKind::Modify),
        ],
        0u64..2048,
        0u32..40,
    )
        .prop_map(|(kind, address, size)| TraceRecord::new(kind, address, size))
}

proptest! {
    #[test]
    fn sets_never_exceed_associativity(
        geometry in geometry_strategy(),
        addrs in prop::collection::vec(0u64..4096, 0..300),
    ) {
        let mut cache = Cache::new(geometry);
        for (now, &addr) in (0u64..).zip(&addrs) {
            let _ = cache.access(addr, now);
            prop_assert!(cache.contains(addr));

            for set_index in 0..geometry.sets() {
                let set = cache.set(set_index).unwrap();
                prop_assert_eq!(set.len(), geometry.ways());

                let tags: Vec<u64> = set.iter().filter(|l| l.valid).map(|l| l.tag).collect();
                let distinct: HashSet<u64> = tags.iter().copied().collect();
                prop_assert!(tags.len() <= geometry.ways());
                prop_assert_eq!(distinct.len(), tags.len());
            }
        }
    }

    #[test]
    fn counters_are_conserved(
        geometry in geometry_strategy(),
        addrs in prop::collection::vec(0u64..4096, 0..300),
    ) {
        let mut cache = Cache::new(geometry);
        let mut evictions = 0u64;
        for (now, &addr) in (0u64..).zip(&addrs) {
            if cache.access(addr, now) == AccessOutcome::Eviction {
                evictions += 1;
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.accesses(), addrs.len() as u64);
        prop_assert!(stats.evictions <= stats.misses);
        prop_assert_eq!(stats.evictions, evictions);
        // Every miss that did not evict consumed one free line.
        prop_assert!(stats.misses - stats.evictions <= geometry.total_lines() as u64);
    }

    #[test]
    fn replay_is_deterministic(
        geometry in geometry_strategy(),
        records in prop::collection::vec(record_strategy(), 0..100),
    ) {
        let first = Replayer::new(Cache::new(geometry)).replay(records.iter().copied());
        let second = Replayer::new(Cache::new(geometry)).replay(records.iter().copied());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn clock_matches_access_count(
        geometry in geometry_strategy(),
        records in prop::collection::vec(record_strategy(), 0..100),
    ) {
        let mut replayer = Replayer::new(Cache::new(geometry));
        let mut issued = 0u64;
        for record in &records {
            issued += replayer.replay_record(record).len() as u64;
        }
        prop_assert_eq!(replayer.clock(), issued);
        prop_assert_eq!(replayer.stats().accesses(), issued);
        prop_assert_eq!(replayer.records(), records.len() as u64);
    }

    #[test]
    fn modify_write_pass_hits_after_single_line_read(
        geometry in geometry_strategy(),
        address in 0u64..4096,
    ) {
        // A one-byte modify always touches exactly one line per pass.
        let mut replayer = Replayer::new(Cache::new(geometry));
        let outcome = replayer.replay_record(&TraceRecord::modify(address, 1));
        prop_assert_eq!(outcome.accesses.len(), 2);
        prop_assert_eq!(outcome.accesses[1], AccessOutcome::Hit);
    }
}
