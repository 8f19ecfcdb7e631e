//! DGIM sliding-window counter
//!
//! Approximates the number of 1-bits among the most recent `N` bits of a
//! stream using O(log² N) bits of state (Datar, Gionis, Indyk, Motwani 2002).

use super::bucket::Bucket;
use super::store::BucketStore;
use crate::traits::{ErrorBounds, Sketch, WindowCountSketch, WindowError};

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

/// Sliding-window 1-bit counter
///
/// Every call to [`ingest`](Self::ingest) advances a logical clock by one
/// tick. A 1-bit becomes a size-1 bucket; buckets of equal size are merged
/// so that at most two of each size exist, and buckets whose newest bit
/// has left the window are dropped.
///
/// # Guarantees
///
/// - Memory: at most `2 · (⌊log₂ N⌋ + 1)` buckets, independent of stream length
/// - [`estimate_ones`](Self::estimate_ones) never undercounts and stays below
///   twice the true count
/// - [`estimate_ones_centered`](Self::estimate_ones_centered) is within 50%
///   of the true count
///
/// # Example
///
/// ```
/// use bitwindow::window::DgimCounter;
///
/// let mut counter = DgimCounter::new(4).unwrap();
///
/// for bit in [1, 0, 1, 1] {
///     counter.ingest(bit).unwrap();
/// }
///
/// assert_eq!(counter.current_time(), 4);
/// assert_eq!(counter.estimate_ones(), 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DgimCounter {
    /// Window size in ticks, fixed at construction
    window: u64,
    /// Ticks processed so far
    current_time: u64,
    /// Buckets, oldest first
    store: BucketStore,
}

impl DgimCounter {
    /// Create a counter over the last `window` bits
    ///
    /// Fails with [`WindowError::InvalidWindow`] when `window` is zero.
    pub fn new(window: u64) -> Result<Self, WindowError> {
        if window == 0 {
            return Err(WindowError::InvalidWindow(window));
        }

        Ok(Self {
            window,
            current_time: 0,
            store: BucketStore::new(),
        })
    }

    /// Window size `N`
    pub fn window(&self) -> u64 {
        self.window
    }

    /// Ticks processed so far
    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// Process one bit, given as `0` or `1`
    ///
    /// Any other value is rejected with [`WindowError::InvalidBit`] before
    /// the clock advances.
    pub fn ingest(&mut self, bit: u8) -> Result<(), WindowError> {
        match bit {
            0 => self.ingest_bool(false),
            1 => self.ingest_bool(true),
            other => return Err(WindowError::InvalidBit(other)),
        }
        Ok(())
    }

    /// Process one bit
    pub fn ingest_bool(&mut self, bit: bool) {
        self.current_time += 1;

        if bit {
            self.store.append_unit_bucket(self.current_time);
            self.store.restore_size_invariant();
        }

        self.store.evict_expired(self.current_time, self.window);
    }

    /// Process bits in order, stopping at the first invalid one
    ///
    /// Bits before the invalid one stay ingested; the invalid bit does not
    /// advance the clock.
    pub fn extend_bits<I>(&mut self, bits: I) -> Result<(), WindowError>
    where
        I: IntoIterator<Item = u8>,
    {
        for bit in bits {
            self.ingest(bit)?;
        }
        Ok(())
    }

    /// Approximate number of 1-bits among the last `min(N, current_time)` ticks
    ///
    /// Sums bucket sizes newest to oldest. A bucket lying at the window
    /// boundary would count for half and end the sum; after eviction no
    /// retained bucket is at the boundary, so this is an upper bound on the
    /// true count.
    pub fn estimate_ones(&self) -> u64 {
        self.store.estimate_ones(self.current_time, self.window)
    }

    /// Classic DGIM estimate: the oldest bucket counts for half its size
    ///
    /// Relative error is at most 50%.
    pub fn estimate_ones_centered(&self) -> u64 {
        self.store.estimate_ones_centered()
    }

    /// Bounds on the true count of 1-bits in the window
    ///
    /// The newest bit of every retained bucket is inside the window, so only
    /// the oldest bucket can be partly outside it: the true count lies in
    /// `[total - oldest + 1, total]`.
    pub fn error_bounds(&self) -> ErrorBounds {
        let upper = self.store.total_size();
        let lower = match self.store.oldest() {
            Some(oldest) => upper - oldest.size() + 1,
            None => 0,
        };
        ErrorBounds::new(
            lower as f64,
            self.estimate_ones() as f64,
            upper as f64,
            1.0,
        )
    }

    /// Number of buckets currently retained
    pub fn num_buckets(&self) -> usize {
        self.store.len()
    }

    /// Copies of the retained buckets, oldest first
    pub fn buckets(&self) -> Vec<Bucket> {
        self.store.iter().copied().collect()
    }

    /// Render the bucket sequence as `(s=size,ts=timestamp)` pairs, oldest first
    pub fn dump(&self) -> String {
        use core::fmt::Write;
        let mut out = String::new();
        // writing into a String cannot fail
        let _ = write!(out, "{}", self.store);
        out
    }
}

impl Sketch for DgimCounter {
    type Item = bool;

    fn update(&mut self, item: &bool) {
        self.ingest_bool(*item);
    }

    fn clear(&mut self) {
        self.current_time = 0;
        self.store.clear();
    }

    fn size_bytes(&self) -> usize {
        core::mem::size_of::<Self>() - core::mem::size_of::<BucketStore>()
            + self.store.size_bytes()
    }

    fn count(&self) -> u64 {
        self.current_time
    }
}

impl WindowCountSketch for DgimCounter {
    fn window(&self) -> u64 {
        self.window
    }

    fn current_time(&self) -> u64 {
        self.current_time
    }

    fn estimate_ones(&self) -> u64 {
        DgimCounter::estimate_ones(self)
    }

    fn error_bounds(&self) -> ErrorBounds {
        DgimCounter::error_bounds(self)
    }
}

impl core::fmt::Display for DgimCounter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "t={} window={} ones~{} buckets: {}",
            self.current_time,
            self.window,
            self.estimate_ones(),
            self.store
        )
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for DgimCounter {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("DgimCounter", 3)?;
        state.serialize_field("window", &self.window)?;
        state.serialize_field("current_time", &self.current_time)?;
        state.serialize_field("buckets", &self.store)?;
        state.end()
    }
}
