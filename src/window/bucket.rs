//! A single exponential-histogram bucket

/// Run of 1-bits recorded only by its count and the tick of its newest bit
///
/// Buckets are immutable values: the store replaces them rather than
/// changing them. `size` is always a power of two.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    size: u64,
    timestamp: u64,
}

impl Bucket {
    /// Fresh bucket for a single 1-bit arriving at `timestamp`
    pub(crate) fn unit(timestamp: u64) -> Self {
        Self { size: 1, timestamp }
    }

    /// Combine two equal-size buckets into one of double size
    ///
    /// The result carries the newer of the two timestamps.
    pub(crate) fn merged(older: Bucket, newer: Bucket) -> Self {
        debug_assert_eq!(older.size, newer.size, "only equal sizes merge");
        Self {
            size: older.size * 2,
            timestamp: older.timestamp.max(newer.timestamp),
        }
    }

    /// Number of 1-bits this bucket stands for
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Tick at which the newest 1-bit of this bucket arrived
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Whether the newest bit has left a window of `window` ticks ending at `current_time`
    #[inline]
    pub fn is_expired(&self, current_time: u64, window: u64) -> bool {
        // timestamp <= current_time - window, without underflow
        self.timestamp.saturating_add(window) <= current_time
    }
}

impl core::fmt::Display for Bucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "(s={},ts={})", self.size, self.timestamp)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Bucket {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.size)?;
        tuple.serialize_element(&self.timestamp)?;
        tuple.end()
    }
}
