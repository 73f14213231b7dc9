//! Spectral characterisation of periodic series.
//!
//! - [`fourier_transform`]: amplitude/phase spectrum with frequency scaling
//! - [`fit_pink_noise`]: power-law fit `A * f^alpha` with covariance-based errors
//! - [`alpha_series`]: the fitted exponent over a sliding trailing window
//!
//! # Example
//!
//! ```
//! use anofox_monitor::spectral::{alpha_series, fit_spectrum, SpectralConfig};
//!
//! let values: Vec<f64> = (0..200).map(|i| (i as f64 * 0.2).sin()).collect();
//! let errors = vec![0.1; 200];
//! let config = SpectralConfig::default();
//!
//! // One fit over the whole series, frequencies in cycles per sample
//! let summary = fit_spectrum(&values, &errors, 1.0, &config).unwrap();
//! assert!(summary.freq_min > 0.0);
//!
//! // Exponent over a 64-sample trailing window
//! let alphas = alpha_series(&values, 64, &errors, 1.0, &config).unwrap();
//! assert_eq!(alphas.len(), values.len());
//! assert!(!alphas.points[10].is_defined());
//! ```

pub mod alpha;
pub mod fourier;
pub mod pink;

pub use alpha::{alpha_series, AlphaPoint, AlphaSeries, AlphaSummary};
pub use fourier::{fft_frequencies, fourier_transform, Spectrum};
pub use pink::{chi_square, fit_pink_noise, pink_model, PinkNoiseFit, SpectralConfig};

use crate::error::{MonitorError, Result};
use crate::utils::stats::{nan_max, nan_mean, nan_min};

/// A whole-series spectral fit with the frequency range it covered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectrumSummary {
    pub fit: PinkNoiseFit,
    pub freq_min: f64,
    pub freq_max: f64,
    pub n_bins: usize,
}

/// Transform the whole series and fit the power law above `config.min_frequency`.
///
/// The shared bin error is the mean of the finite measurement errors.
pub fn fit_spectrum(
    values: &[f64],
    errors: &[f64],
    samples_per_unit: f64,
    config: &SpectralConfig,
) -> Result<SpectrumSummary> {
    if errors.len() != values.len() {
        return Err(MonitorError::DimensionMismatch {
            expected: values.len(),
            got: errors.len(),
        });
    }
    if values.is_empty() {
        return Err(MonitorError::EmptyData);
    }
    config.validate()?;

    let spectrum = fourier_transform(values, samples_per_unit);
    let (freqs, amps) = spectrum.above(config.min_frequency);
    let fit = fit_pink_noise(&freqs, &amps, &[nan_mean(errors)], config)?;

    Ok(SpectrumSummary {
        fit,
        freq_min: nan_min(&freqs),
        freq_max: nan_max(&freqs),
        n_bins: freqs.len(),
    })
}
