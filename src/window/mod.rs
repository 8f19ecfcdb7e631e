//! Sliding-window counting of 1-bits
//!
//! This module provides the DGIM exponential histogram: a counter that
//! approximates how many 1-bits arrived in the last `N` ticks of a bit
//! stream while retaining only O(log N) buckets.
//!
//! # Components
//!
//! - [`Bucket`]: a power-of-two count of 1-bits and the tick of its newest bit
//! - [`BucketStore`]: the oldest-first bucket sequence with merge and eviction
//! - [`DgimCounter`]: the per-stream counter driving ingestion and queries
//!
//! # Example
//!
//! ```
//! use bitwindow::window::DgimCounter;
//!
//! let mut counter = DgimCounter::new(1000).unwrap();
//!
//! for i in 0..100_000u32 {
//!     counter.ingest((i % 3 == 0) as u8).unwrap();
//! }
//!
//! // about a third of the last 1000 ticks were ones
//! let estimate = counter.estimate_ones();
//! assert!(estimate >= 333 && estimate <= 668);
//! ```
//!
//! Counters are independent values with no shared state; to process several
//! streams in parallel, give each stream its own counter.

mod bucket;
mod dgim;
mod store;

pub use bucket::Bucket;
pub use dgim::DgimCounter;
pub use store::BucketStore;

/// Upper bound on buckets retained for a window of `window` ticks
///
/// Sizes are powers of two no larger than the window, and at most two
/// buckets of each size exist: `2 · (⌊log₂ N⌋ + 1)`.
pub fn max_buckets_for_window(window: u64) -> usize {
    if window == 0 {
        return 0;
    }
    2 * (window.ilog2() as usize + 1)
}

/// Approximate memory in bytes for a counter over `window` ticks
pub fn memory_for_window(window: u64) -> usize {
    max_buckets_for_window(window) * core::mem::size_of::<Bucket>()
}

/// Worst-case relative error of [`DgimCounter::estimate_ones_centered`]
pub fn relative_error_bound() -> f64 {
    0.5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_buckets_for_window() {
        assert_eq!(max_buckets_for_window(0), 0);
        assert_eq!(max_buckets_for_window(1), 2);
        assert_eq!(max_buckets_for_window(3), 4);
        assert_eq!(max_buckets_for_window(4), 6);
        assert_eq!(max_buckets_for_window(1024), 22);
    }

    #[test]
    fn test_memory_grows_logarithmically() {
        let small = memory_for_window(1 << 10);
        let large = memory_for_window(1 << 20);
        assert!(large < small * 3);
        assert_eq!(memory_for_window(1), 2 * core::mem::size_of::<Bucket>());
    }

    #[test]
    fn test_all_ones_stays_within_bound() {
        for window in [1u64, 2, 3, 7, 16, 100] {
            let mut counter = DgimCounter::new(window).unwrap();
            for _ in 0..1000 {
                counter.ingest(1).unwrap();
                assert!(counter.num_buckets() <= max_buckets_for_window(window));
            }
        }
    }
}
