//! Ordered bucket sequence backing the window counter
//!
//! Buckets are kept oldest first in a ring buffer. New unit buckets are
//! appended at the newest end, expired buckets leave from the oldest end,
//! and merges splice two buckets into one in place.

use super::bucket::Bucket;

#[cfg(feature = "std")]
use std::collections::VecDeque;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::collections::VecDeque;

/// Bucket sizes are powers of two of a `u64`, so 64 tiers cover every size.
const TIERS: usize = 64;

/// Most buckets of a single size allowed once the invariant is restored
const MAX_PER_SIZE: u8 = 2;

/// Oldest-first sequence of buckets
///
/// Invariants after [`restore_size_invariant`](Self::restore_size_invariant):
/// - every size is a power of two
/// - no size occurs more than twice
/// - timestamps are non-decreasing from oldest to newest
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BucketStore {
    buckets: VecDeque<Bucket>,
}

impl BucketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            buckets: VecDeque::new(),
        }
    }

    /// Number of buckets held
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if the store holds no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Oldest bucket, if any
    pub fn oldest(&self) -> Option<&Bucket> {
        self.buckets.front()
    }

    /// Newest bucket, if any
    pub fn newest(&self) -> Option<&Bucket> {
        self.buckets.back()
    }

    /// Iterate buckets oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Bucket> + ExactSizeIterator + '_ {
        self.buckets.iter()
    }

    /// Sum of all bucket sizes
    pub fn total_size(&self) -> u64 {
        self.buckets.iter().map(Bucket::size).sum()
    }

    /// Drop every bucket
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Approximate heap plus inline footprint in bytes
    pub fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>() + self.buckets.capacity() * core::mem::size_of::<Bucket>()
    }

    /// Append a size-1 bucket at the newest end
    ///
    /// `timestamp` must not be older than the newest bucket already held.
    pub fn append_unit_bucket(&mut self, timestamp: u64) {
        debug_assert!(
            self.buckets.back().map_or(true, |b| b.timestamp() <= timestamp),
            "timestamps must be appended in order"
        );
        self.buckets.push_back(Bucket::unit(timestamp));
    }

    /// Merge buckets until no size occurs more than twice
    ///
    /// Scans newest to oldest counting each size. When a size is seen a third
    /// time, the two oldest buckets of that size are merged in place and the
    /// scan restarts from the newest end, since the merged bucket may push
    /// the next tier over its limit. Returns the number of merges performed.
    pub fn restore_size_invariant(&mut self) -> usize {
        let mut merges = 0;
        let mut restart = true;

        while restart {
            restart = false;
            let mut seen = [0u8; TIERS];

            for older in (0..self.buckets.len()).rev() {
                let size = self.buckets[older].size();
                let tier = size.trailing_zeros() as usize;
                seen[tier] += 1;

                if seen[tier] > MAX_PER_SIZE {
                    // `older` is the oldest of three; its partner is the nearest
                    // newer bucket of the same size.
                    let partner = (older + 1..self.buckets.len())
                        .find(|&idx| self.buckets[idx].size() == size);
                    if let Some(newer) = partner {
                        self.merge_pair(older, newer);
                        merges += 1;
                        restart = true;
                    }
                    break;
                }
            }
        }

        merges
    }

    /// Replace the buckets at `older` and `newer` with their merge, at `older`
    fn merge_pair(&mut self, older: usize, newer: usize) {
        if let Some(newer_bucket) = self.buckets.remove(newer) {
            let older_bucket = self.buckets[older];
            self.buckets[older] = Bucket::merged(older_bucket, newer_bucket);
        }
    }

    /// Remove whole buckets from the oldest end whose newest bit left the window
    ///
    /// Returns the number of buckets removed.
    pub fn evict_expired(&mut self, current_time: u64, window: u64) -> usize {
        let mut removed = 0;
        while self
            .buckets
            .front()
            .is_some_and(|b| b.is_expired(current_time, window))
        {
            self.buckets.pop_front();
            removed += 1;
        }
        removed
    }

    /// Estimate 1-bits in the window, newest to oldest
    ///
    /// Buckets inside the window count in full. The first bucket at or past
    /// the window boundary counts for half its size and ends the traversal.
    /// Halves are accumulated exactly and only the final total is floored.
    pub fn estimate_ones(&self, current_time: u64, window: u64) -> u64 {
        let mut doubled = 0u64;
        for bucket in self.buckets.iter().rev() {
            if bucket.is_expired(current_time, window) {
                doubled += bucket.size();
                break;
            }
            doubled += 2 * bucket.size();
        }
        doubled / 2
    }

    /// Estimate counting the oldest bucket at half its size
    ///
    /// Only the oldest retained bucket can straddle the window start, so
    /// halving it keeps the relative error within 50%. A size-1 oldest bucket
    /// is its own newest bit and counts in full. Assumes eviction has already
    /// run for the current tick.
    pub fn estimate_ones_centered(&self) -> u64 {
        match self.buckets.front() {
            None => 0,
            Some(oldest) => self.total_size() - oldest.size() / 2,
        }
    }
}

impl core::fmt::Display for BucketStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.buckets.is_empty() {
            return write!(f, "None");
        }
        for (i, bucket) in self.buckets.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{}", bucket)?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for BucketStore {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.buckets.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "std")]
    use std::vec::Vec;
    #[cfg(not(feature = "std"))]
    use alloc::vec::Vec;

    fn pairs(store: &BucketStore) -> Vec<(u64, u64)> {
        store.iter().map(|b| (b.size(), b.timestamp())).collect()
    }

    fn store_with_ones(ticks: &[u64]) -> BucketStore {
        let mut store = BucketStore::new();
        for &t in ticks {
            store.append_unit_bucket(t);
            store.restore_size_invariant();
        }
        store
    }

    #[test]
    fn test_empty() {
        let store = BucketStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.total_size(), 0);
        assert_eq!(store.estimate_ones(10, 4), 0);
        assert_eq!(store.estimate_ones_centered(), 0);
        assert!(store.oldest().is_none());
    }

    #[test]
    fn test_two_of_a_size_do_not_merge() {
        let mut store = BucketStore::new();
        store.append_unit_bucket(1);
        store.append_unit_bucket(2);
        assert_eq!(store.restore_size_invariant(), 0);
        assert_eq!(pairs(&store), vec![(1, 1), (1, 2)]);
    }

    #[test]
    fn test_third_unit_merges_two_oldest() {
        let mut store = BucketStore::new();
        store.append_unit_bucket(1);
        store.append_unit_bucket(2);
        store.append_unit_bucket(3);
        assert_eq!(store.restore_size_invariant(), 1);
        assert_eq!(pairs(&store), vec![(2, 2), (1, 3)]);
    }

    #[test]
    fn test_cascading_merge() {
        // (2,2) (2,4) (1,5) (1,6) + (1,7) -> merge ones -> three twos -> merge twos
        let mut store = store_with_ones(&[1, 2, 3, 4, 5, 6]);
        assert_eq!(pairs(&store), vec![(2, 2), (2, 4), (1, 5), (1, 6)]);

        store.append_unit_bucket(7);
        assert_eq!(store.restore_size_invariant(), 2);
        assert_eq!(pairs(&store), vec![(4, 4), (2, 6), (1, 7)]);
    }

    #[test]
    fn test_equal_valued_buckets_are_distinct() {
        // several ones at the same tick are still separate buckets
        let mut store = BucketStore::new();
        store.append_unit_bucket(5);
        store.append_unit_bucket(5);
        store.append_unit_bucket(5);
        store.restore_size_invariant();
        assert_eq!(pairs(&store), vec![(2, 5), (1, 5)]);
    }

    #[test]
    fn test_evict_expired() {
        let mut store = store_with_ones(&[1, 2, 3, 4]);
        assert_eq!(pairs(&store), vec![(2, 2), (1, 3), (1, 4)]);

        // window 2 ending at t=4 covers ticks 3..=4
        assert_eq!(store.evict_expired(4, 2), 1);
        assert_eq!(pairs(&store), vec![(1, 3), (1, 4)]);

        // second call is a no-op
        assert_eq!(store.evict_expired(4, 2), 0);
        assert_eq!(pairs(&store), vec![(1, 3), (1, 4)]);

        assert_eq!(store.evict_expired(100, 2), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_estimate_halves_boundary_bucket() {
        let store = store_with_ones(&[1, 2, 3, 4]);
        // no eviction: (2,2) sits on the boundary of a window of 2 at t=4
        assert_eq!(store.estimate_ones(4, 2), 1 + 1 + 1);
        // everything inside a wide window counts fully
        assert_eq!(store.estimate_ones(4, 10), 4);
    }

    #[test]
    fn test_estimate_floors_only_final_total() {
        let mut store = BucketStore::new();
        store.append_unit_bucket(1);
        store.append_unit_bucket(5);
        // (1,1) on the boundary counts 0.5, total 1.5 floors to 1
        assert_eq!(store.estimate_ones(5, 4), 1);
    }

    #[test]
    fn test_estimate_ones_centered() {
        let store = store_with_ones(&[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(pairs(&store), vec![(4, 4), (2, 6), (1, 7)]);
        // 4/2 + 2 + 1
        assert_eq!(store.estimate_ones_centered(), 5);

        let single = store_with_ones(&[9]);
        assert_eq!(single.estimate_ones_centered(), 1);
    }

    #[test]
    fn test_display() {
        let store = store_with_ones(&[1, 2, 3]);
        assert_eq!(store.to_string(), "(s=2,ts=2) | (s=1,ts=3)");
        assert_eq!(BucketStore::new().to_string(), "None");
    }

    #[test]
    fn test_clear() {
        let mut store = store_with_ones(&[1, 2, 3]);
        store.clear();
        assert!(store.is_empty());
    }
}
