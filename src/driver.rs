//! Text front end for the window counter
//!
//! Turns raw text into bits and a window size, feeds a [`DgimCounter`] one
//! bit per tick, and records an execution trace. Nothing here performs I/O;
//! callers read the input and print the [`TraceRow`]s however they like.
//!
//! # Example
//!
//! ```
//! use bitwindow::driver::{parse_bits, parse_window, run_trace};
//!
//! let bits = parse_bits("1 0 1 1").unwrap();
//! let window = parse_window("4").unwrap();
//!
//! let trace = run_trace(&bits, window).unwrap();
//! assert_eq!(trace[3].to_string(), "t=04 | bit=1 | Approx 1's=3  Buckets: (s=2,ts=3) | (s=1,ts=4)");
//! ```

use crate::traits::{ParseError, WindowError};
use crate::window::DgimCounter;

#[cfg(feature = "std")]
use std::{string::String, vec::Vec};

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

/// Error from parsing input or running the counter over it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Input text could not be parsed
    Parse(ParseError),
    /// The counter rejected a bit or window size
    Window(WindowError),
}

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DriverError::Parse(err) => write!(f, "{}", err),
            DriverError::Window(err) => write!(f, "{}", err),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Parse(err) => Some(err),
            DriverError::Window(err) => Some(err),
        }
    }
}

impl From<ParseError> for DriverError {
    fn from(err: ParseError) -> Self {
        DriverError::Parse(err)
    }
}

impl From<WindowError> for DriverError {
    fn from(err: WindowError) -> Self {
        DriverError::Window(err)
    }
}

/// Extract bits from raw text
///
/// Every `0` and `1` character is taken in order, so `"100101"`,
/// `"1 0 1"` and `"1,0,1"` all work. If the text holds no such character,
/// it is split on commas and whitespace and each token parsed as an
/// integer; those values are checked later, when they are ingested.
pub fn parse_bits(raw: &str) -> Result<Vec<u8>, ParseError> {
    let raw = raw.trim();

    let bits: Vec<u8> = raw
        .chars()
        .filter_map(|c| match c {
            '0' => Some(0),
            '1' => Some(1),
            _ => None,
        })
        .collect();
    if !bits.is_empty() {
        return Ok(bits);
    }

    let values = raw
        .replace(',', " ")
        .split_whitespace()
        .map(|token| {
            token
                .parse::<u8>()
                .map_err(|_| ParseError::InvalidToken(String::from(token)))
        })
        .collect::<Result<Vec<u8>, ParseError>>()?;

    if values.is_empty() {
        return Err(ParseError::NoBits);
    }
    Ok(values)
}

/// Parse a window size; it must be a positive integer
pub fn parse_window(raw: &str) -> Result<u64, ParseError> {
    match raw.trim().parse::<u64>() {
        Ok(window) if window > 0 => Ok(window),
        _ => Err(ParseError::InvalidWindow(String::from(raw.trim()))),
    }
}

/// State of the counter right after one tick
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceRow {
    /// Tick just processed
    pub time: u64,
    /// Bit ingested at this tick
    pub bit: u8,
    /// Estimated 1-bits in the window after this tick
    pub estimate: u64,
    /// Bucket dump after this tick
    pub buckets: String,
}

impl core::fmt::Display for TraceRow {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "t={:02} | bit={} | Approx 1's={}  Buckets: {}",
            self.time, self.bit, self.estimate, self.buckets
        )
    }
}

/// Run a fresh counter over `bits`, recording one row per tick
///
/// Stops with an error at the first value that is not 0 or 1.
pub fn run_trace(bits: &[u8], window: u64) -> Result<Vec<TraceRow>, DriverError> {
    let mut counter = DgimCounter::new(window)?;
    let mut rows = Vec::with_capacity(bits.len());

    for &bit in bits {
        counter.ingest(bit)?;
        rows.push(TraceRow {
            time: counter.current_time(),
            bit,
            estimate: counter.estimate_ones(),
            buckets: counter.dump(),
        });
    }

    Ok(rows)
}

/// Parse both inputs and run the trace
pub fn trace_text(raw_bits: &str, raw_window: &str) -> Result<Vec<TraceRow>, DriverError> {
    let bits = parse_bits(raw_bits)?;
    let window = parse_window(raw_window)?;
    run_trace(&bits, window)
}
