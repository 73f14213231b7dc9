//! Core data structures: validated series, feature frames and sample rates.

mod series;

pub use series::{infer_interval, FeatureFrame, SampleRate, SampleUnit, Series};
pub(crate) use series::duration_seconds;
