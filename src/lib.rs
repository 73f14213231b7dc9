//! # anofox-monitor
//!
//! Statistical anomaly monitoring for periodic, noisy sensor time series.
//!
//! Three independent analyses over uniformly sampled data:
//!
//! - [`changepoint`]: Bayesian Online Changepoint Detection over a differenced series
//! - [`spectral`]: Fourier spectrum, pink-noise (`A * f^alpha`) fits and a sliding
//!   exponent series
//! - [`pca`] and [`regions`]: rolling PCA with Hotelling T² and Q p-values, fault
//!   regions and flag rates
//!
//! Every function takes its configuration explicitly and returns plain values; nothing
//! is cached or shared between calls.

pub mod changepoint;
pub mod config;
pub mod core;
pub mod error;
pub mod pca;
pub mod regions;
pub mod spectral;
pub mod transform;
pub mod utils;

pub use error::{MonitorError, Result};

pub mod prelude {
    pub use crate::changepoint::{bocpd_detect, detect_series, BocpdConfig, BocpdResult};
    pub use crate::config::MonitorConfig;
    pub use crate::core::{FeatureFrame, SampleRate, SampleUnit, Series};
    pub use crate::error::{MonitorError, Result};
    pub use crate::pca::{rolling_pca, PcaConfig, RollingPcaResult, StatisticFrame};
    pub use crate::regions::{collect_regions, RateConfig, Region, RegionConfig};
    pub use crate::spectral::{alpha_series, fit_pink_noise, fourier_transform, SpectralConfig};
}
