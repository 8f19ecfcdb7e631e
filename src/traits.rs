//! Core traits for sliding-window streaming counters
//!
//! All counters implement the base [`Sketch`] trait, with [`WindowCountSketch`]
//! adding the window-scoped count query. Error types for the core and the
//! text driver live here as well.

use core::fmt::Debug;

#[cfg(feature = "std")]
use std::string::String;

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Error raised by a window counter
///
/// Every failing operation is rejected before any state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// A value other than 0 or 1 was offered as a bit
    InvalidBit(u8),
    /// The window size must be at least one tick
    InvalidWindow(u64),
}

impl core::fmt::Display for WindowError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WindowError::InvalidBit(bit) => {
                write!(f, "invalid bit: expected 0 or 1, found {}", bit)
            }
            WindowError::InvalidWindow(window) => {
                write!(f, "invalid window size: expected a positive size, found {}", window)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for WindowError {}

/// Error while turning raw text into bits or a window size
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input contained no bits at all
    NoBits,
    /// A separated token was not an integer in `0..=255`
    InvalidToken(String),
    /// Window text was not a positive integer
    InvalidWindow(String),
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::NoBits => write!(
                f,
                "couldn't parse bits: enter only 0/1, contiguous ('100101') \
                 or space/comma separated ('1 0 1', '1,0,1')"
            ),
            ParseError::InvalidToken(token) => {
                write!(f, "couldn't parse bits: invalid token {:?}", token)
            }
            ParseError::InvalidWindow(raw) => {
                write!(f, "window size must be a positive integer, found {:?}", raw)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

/// Error bounds for a window estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorBounds {
    /// Lower bound of the estimate
    pub lower: f64,
    /// Point estimate
    pub estimate: f64,
    /// Upper bound of the estimate
    pub upper: f64,
    /// Confidence level (1.0 for deterministic bounds)
    pub confidence: f64,
}

impl ErrorBounds {
    /// Create new error bounds
    pub fn new(lower: f64, estimate: f64, upper: f64, confidence: f64) -> Self {
        Self {
            lower,
            estimate,
            upper,
            confidence,
        }
    }

    /// Check if a value falls within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Width of the interval
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Relative width (width / estimate)
    pub fn relative_width(&self) -> f64 {
        if self.estimate == 0.0 {
            0.0
        } else {
            self.width() / self.estimate
        }
    }
}

/// Core trait for all streaming counters
pub trait Sketch: Clone + Debug {
    /// The type of item this sketch processes
    type Item: ?Sized;

    /// Add an item to the sketch
    fn update(&mut self, item: &Self::Item);

    /// Reset sketch to its freshly constructed state
    fn clear(&mut self);

    /// Memory usage in bytes
    fn size_bytes(&self) -> usize;

    /// Number of items processed
    fn count(&self) -> u64;

    /// Check if sketch is empty
    fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

/// Counters that approximate how many 1-bits arrived in the last `N` ticks
pub trait WindowCountSketch: Sketch<Item = bool> {
    /// Window size `N` in ticks
    fn window(&self) -> u64;

    /// Logical clock: number of bits processed so far
    fn current_time(&self) -> u64;

    /// Approximate number of 1-bits among the last `min(N, current_time)` ticks
    fn estimate_ones(&self) -> u64;

    /// Deterministic bounds on the true count
    fn error_bounds(&self) -> ErrorBounds;

    /// Number of ticks the current estimate actually covers
    fn covered_ticks(&self) -> u64 {
        self.window().min(self.current_time())
    }
}
