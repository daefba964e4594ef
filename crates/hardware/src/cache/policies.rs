//! Cache Replacement Policies.
//!
//! FIFO and LRU share one eviction rule: the victim is the line with the smallest
//! recency stamp. The policy only decides when a stamp is written.
//!
//! | Policy | Stamped on fill | Stamped on hit |
//! |--------|-----------------|----------------|
//! | FIFO   | yes             | no             |
//! | LRU    | yes             | yes            |
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `victim_way()`: O(W) where W is the number of ways (associativity)
//! - **Space Complexity:** one `u64` stamp per line

use super::CacheLine;
use crate::config::ReplacementPolicy;

/// Updates a line's recency stamp after a hit.
///
/// FIFO preserves the fill stamp so that insertion order alone decides eviction.
#[inline]
pub fn touch(policy: ReplacementPolicy, line: &mut CacheLine, now: u64) {
    if policy.stamps_on_hit() {
        line.stamp = now;
    }
}

/// Selects the way to evict from a full set.
///
/// Returns the way holding the minimum stamp. On equal stamps the lowest way index
/// wins. Stamps are unique per access in practice, but the order must not depend
/// on iteration details.
///
/// Returns `0` for an empty slice; a validated geometry never produces one.
pub fn victim_way(set: &[CacheLine]) -> usize {
    set.iter()
        .enumerate()
        .min_by_key(|(_, line)| line.stamp)
        .map_or(0, |(way, _)| way)
}
