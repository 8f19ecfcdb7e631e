//! # Bitwindow
//!
//! Bounded-memory sliding-window counting for bit streams.
//!
//! Bitwindow answers "how many 1s arrived in the last `N` bits?" without
//! storing the last `N` bits. It implements the DGIM exponential histogram,
//! which keeps O(log N) buckets no matter how long the stream runs.
//!
//! ## Features
//!
//! - **Sliding-Window Counting**: approximate 1-bit counts with [`DgimCounter`]
//! - **Deterministic Error Bounds**: the true count always lies in
//!   [`error_bounds`](DgimCounter::error_bounds)
//! - **Bounded Memory**: at most `2 · (⌊log₂ N⌋ + 1)` buckets per counter
//! - **Text Driver**: parse bit strings and produce a per-tick trace
//!
//! ## Quick Start
//!
//! ```rust
//! use bitwindow::prelude::*;
//!
//! // Count ones over the last 4 bits
//! let mut counter = DgimCounter::new(4).unwrap();
//! for bit in [1, 0, 1, 1] {
//!     counter.ingest(bit).unwrap();
//! }
//! println!("ones in window: ~{}", counter.estimate_ones());
//! ```
//!
//! ## Errors
//!
//! The core never logs or prints. Invalid input is returned as a
//! [`WindowError`](traits::WindowError) and leaves the counter untouched:
//!
//! ```rust
//! use bitwindow::traits::WindowError;
//! use bitwindow::window::DgimCounter;
//!
//! assert_eq!(DgimCounter::new(0), Err(WindowError::InvalidWindow(0)));
//!
//! let mut counter = DgimCounter::new(8).unwrap();
//! assert_eq!(counter.ingest(2), Err(WindowError::InvalidBit(2)));
//! assert_eq!(counter.current_time(), 0);
//! ```
//!
//! ## Feature Flags
//!
//! Algorithm families:
//! - `window` (default): the DGIM sliding-window counter
//! - `driver` (default): text parsing and execution traces
//! - `full`: Enable all algorithm families
//!
//! Platform features:
//! - `std` (default): Standard library support
//! - `serde`: Serialize counter state for snapshots and debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Core traits always available
pub mod traits;

#[cfg(feature = "window")]
#[cfg_attr(docsrs, doc(cfg(feature = "window")))]
pub mod window;

#[cfg(feature = "driver")]
#[cfg_attr(docsrs, doc(cfg(feature = "driver")))]
pub mod driver;

pub mod prelude {
    pub use crate::traits::*;

    #[cfg(feature = "window")]
    pub use crate::window::DgimCounter;

    #[cfg(feature = "driver")]
    pub use crate::driver::{parse_bits, parse_window, run_trace, TraceRow};
}

#[cfg(feature = "window")]
pub use window::DgimCounter;
