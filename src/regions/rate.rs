//! Flag rates: smoothed region indicators scaled to events per day.

use super::extract::{find_regions, RegionConfig};
use crate::core::{duration_seconds, SampleRate};
use crate::error::{MonitorError, Result};
use crate::pca::StatisticFrame;
use crate::transform::rolling_mean;
use chrono::Duration;

/// Rate smoothing configuration.
#[derive(Debug, Clone)]
pub struct RateConfig {
    /// Half-width of the smoothing window; the mean runs over twice this span.
    pub window: Duration,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            window: Duration::weeks(1),
        }
    }
}

impl RateConfig {
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Window length in samples at `sample_rate`.
    pub fn window_samples(&self, sample_rate: &SampleRate) -> Result<usize> {
        if duration_seconds(self.window) <= 0.0 {
            return Err(MonitorError::InvalidParameter(format!(
                "rate window must be positive, got {}",
                self.window
            )));
        }
        Ok(sample_rate.samples_in(self.window).max(1))
    }
}

/// Centred rolling mean of `flags` over `2 * window_samples`, times `samples_per_day`.
///
/// With 0/1 flags the result lies in `[0, samples_per_day]`.
pub fn flag_rate(flags: &[f64], window_samples: usize, samples_per_day: f64) -> Vec<f64> {
    rolling_mean(flags, 2 * window_samples, true)
        .into_iter()
        .map(|m| m * samples_per_day)
        .collect()
}

/// Aggregate rate series for each threshold in `alpha_limits`.
pub fn rates_for_limits(
    t2: &StatisticFrame,
    q: &StatisticFrame,
    sample_rate: &SampleRate,
    alpha_limits: &[f64],
    n_components: usize,
    config: &RegionConfig,
    rate_config: &RateConfig,
) -> Result<Vec<Vec<f64>>> {
    let no_residual;
    let q = if n_components == t2.n_features() {
        no_residual = q.filled(0.0);
        &no_residual
    } else {
        q
    };

    alpha_limits
        .iter()
        .map(|&limit| {
            let config = config.clone().alpha_limit(limit);
            find_regions(t2, q, None, sample_rate, &config, rate_config).map(|r| r.rates)
        })
        .collect()
}
