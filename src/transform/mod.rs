//! Series transforms used ahead of the analysis cores.
//!
//! # Example
//!
//! ```
//! use anofox_monitor::transform::{diff, rolling_mean};
//!
//! let series = vec![1.0, 2.0, 4.0, 7.0, 11.0];
//!
//! // First differences remove levels and slow trends
//! let d = diff(&series);
//! assert_eq!(d, vec![1.0, 2.0, 3.0, 4.0]);
//!
//! // Centred rolling mean with window 3
//! let rm = rolling_mean(&d, 3, true);
//! assert_eq!(rm.len(), d.len());
//! ```

pub mod window;

pub use window::{diff, rolling_mean};
