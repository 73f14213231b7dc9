//! Changepoint detection.
//!
//! Bayesian Online Changepoint Detection over a scalar series with per-point
//! measurement errors. The detector tracks the posterior over the run length (samples
//! since the last changepoint); a drop in the most probable run length marks a change.
//!
//! # Example
//!
//! ```
//! use anofox_monitor::changepoint::{bocpd_detect, BocpdConfig};
//!
//! // Level shift at index 50
//! let mut series = vec![0.0; 50];
//! series.extend(vec![10.0; 50]);
//! let errors = vec![0.5; 100];
//!
//! let config = BocpdConfig::default().hazard(0.01);
//! let result = bocpd_detect(&series, &errors, &config).unwrap();
//!
//! assert_eq!(result.changepoints(), vec![50]);
//! assert_eq!(result.max_run_lengths[99], 49);
//! ```

pub mod bocpd;
pub mod posterior;
pub mod summary;

pub use bocpd::{
    bocpd_detect, detect_series, predictive_step, truncation_length, BocpdConfig, BocpdResult,
};
pub use posterior::RunLengthPosterior;
pub use summary::RunLengthSummary;
