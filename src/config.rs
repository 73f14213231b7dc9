//! Monitor-wide configuration.
//!
//! Bundles every component configuration. Durations are kept in wall-clock units and
//! converted to sample counts once the sample rate of a series is known.

use crate::changepoint::BocpdConfig;
use crate::core::{duration_seconds, SampleRate};
use crate::error::{MonitorError, Result};
use crate::pca::PcaConfig;
use crate::regions::{RateConfig, RegionConfig};
use crate::spectral::SpectralConfig;
use chrono::Duration;

/// Configuration for a full monitoring pass.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub bocpd: BocpdConfig,
    pub spectral: SpectralConfig,
    pub pca: PcaConfig,
    pub regions: RegionConfig,
    pub rate: RateConfig,
    /// Analysis window for the alpha series and the PCA training window.
    pub window: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            bocpd: BocpdConfig::default(),
            spectral: SpectralConfig::default(),
            pca: PcaConfig::default(),
            regions: RegionConfig::default(),
            rate: RateConfig::default(),
            window: Duration::weeks(1),
        }
    }
}

impl MonitorConfig {
    pub fn bocpd(mut self, bocpd: BocpdConfig) -> Self {
        self.bocpd = bocpd;
        self
    }

    pub fn spectral(mut self, spectral: SpectralConfig) -> Self {
        self.spectral = spectral;
        self
    }

    pub fn pca(mut self, pca: PcaConfig) -> Self {
        self.pca = pca;
        self
    }

    pub fn regions(mut self, regions: RegionConfig) -> Self {
        self.regions = regions;
        self
    }

    pub fn rate(mut self, rate: RateConfig) -> Self {
        self.rate = rate;
        self
    }

    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Validate every component that can be checked without data.
    pub fn validate(&self) -> Result<()> {
        self.bocpd.validate()?;
        self.spectral.validate()?;
        self.regions.validate()?;
        if duration_seconds(self.window) <= 0.0 {
            return Err(MonitorError::InvalidParameter(format!(
                "analysis window must be positive, got {}",
                self.window
            )));
        }
        if duration_seconds(self.rate.window) <= 0.0 {
            return Err(MonitorError::InvalidParameter(format!(
                "rate window must be positive, got {}",
                self.rate.window
            )));
        }
        if self.pca.n_components == 0 {
            return Err(MonitorError::InvalidParameter(
                "n_components must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Analysis window in samples.
    pub fn window_samples(&self, sample_rate: &SampleRate) -> usize {
        sample_rate.samples_in(self.window)
    }

    /// PCA configuration with the training window taken from [`Self::window`].
    pub fn pca_for(&self, sample_rate: &SampleRate) -> PcaConfig {
        self.pca.clone().window(self.window_samples(sample_rate))
    }
}
