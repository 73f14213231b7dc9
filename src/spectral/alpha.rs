//! Sliding-window power-law exponent series.
//!
//! A trailing window is slid over the series one sample at a time; each window is
//! Fourier transformed and fitted with [`fit_pink_noise`](super::fit_pink_noise). The
//! fitted exponent is recorded at the index just past the window, so the first
//! `window_size` entries are undefined.

use super::fourier::fourier_transform;
use super::pink::{fit_pink_noise_from, SpectralConfig};
use crate::error::{MonitorError, Result};
use crate::utils::stats::{nan_max, nan_mean, nan_min, nan_std};

/// Exponent and its error at one index of the source series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaPoint {
    pub alpha: f64,
    pub error: f64,
}

impl AlphaPoint {
    /// Marker for indices without a full trailing window.
    pub const UNDEFINED: AlphaPoint = AlphaPoint {
        alpha: f64::NEG_INFINITY,
        error: f64::NEG_INFINITY,
    };

    /// Whether a window was fitted at this index.
    pub fn is_defined(&self) -> bool {
        self.alpha != f64::NEG_INFINITY
    }

    /// Whether the fit at this index is usable (defined with finite error).
    pub fn is_usable(&self) -> bool {
        self.is_defined() && self.error.is_finite()
    }
}

/// Exponent series aligned to the source series.
#[derive(Debug, Clone)]
pub struct AlphaSeries {
    pub points: Vec<AlphaPoint>,
    /// Window length in samples.
    pub window_size: usize,
}

impl AlphaSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Exponents with the undefined sentinel kept in place.
    pub fn alphas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.alpha).collect()
    }

    pub fn errors(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.error).collect()
    }

    /// Summary over the usable points.
    pub fn summary(&self) -> AlphaSummary {
        let usable: Vec<f64> = self
            .points
            .iter()
            .filter(|p| p.is_usable())
            .map(|p| p.alpha)
            .collect();
        AlphaSummary {
            min: nan_min(&usable),
            max: nan_max(&usable),
            mean: nan_mean(&usable),
            std: nan_std(&usable),
            n_fits: usable.len(),
        }
    }
}

/// Summary statistics of an exponent series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation.
    pub std: f64,
    /// Number of usable fits summarised.
    pub n_fits: usize,
}

/// Slide a power-law fit over `values`.
///
/// The spectral error applied to every bin is the mean of the finite entries of
/// `errors`. Each successful fit seeds the next window's initial guess; a failed fit
/// resets the guess to `config.initial_guess`.
///
/// Series no longer than `window_size` produce an all-undefined result.
///
/// # Arguments
/// * `values` - Evenly spaced samples
/// * `window_size` - Window length in samples
/// * `errors` - Per-sample measurement errors (same length as `values`)
/// * `samples_per_unit` - Frequency scaling, e.g. samples per year
/// * `config` - Spectral fit configuration
pub fn alpha_series(
    values: &[f64],
    window_size: usize,
    errors: &[f64],
    samples_per_unit: f64,
    config: &SpectralConfig,
) -> Result<AlphaSeries> {
    if errors.len() != values.len() {
        return Err(MonitorError::DimensionMismatch {
            expected: values.len(),
            got: errors.len(),
        });
    }
    if window_size < 2 {
        return Err(MonitorError::InvalidParameter(format!(
            "window_size must be at least 2, got {window_size}"
        )));
    }
    if !(samples_per_unit.is_finite() && samples_per_unit > 0.0) {
        return Err(MonitorError::InvalidParameter(format!(
            "samples_per_unit must be positive, got {samples_per_unit}"
        )));
    }
    config.validate()?;

    let n = values.len();
    let mut points = vec![AlphaPoint::UNDEFINED; n];
    if n <= window_size {
        return Ok(AlphaSeries {
            points,
            window_size,
        });
    }

    let spectral_error = [nan_mean(errors)];
    let mut guess = config.initial_guess;
    let mut failures = 0usize;

    for end in window_size..n {
        let spectrum = fourier_transform(&values[end - window_size..end], samples_per_unit);
        let (freqs, amps) = spectrum.above(config.min_frequency);
        let fit = fit_pink_noise_from(&freqs, &amps, &spectral_error, guess, config);

        points[end] = AlphaPoint {
            alpha: fit.alpha,
            error: fit.alpha_error,
        };
        if fit.is_valid() {
            guess = fit.params();
        } else {
            failures += 1;
            guess = config.initial_guess;
        }
    }

    log::debug!(
        "alpha series: {} windows of {} samples, {} failed fits",
        n - window_size,
        window_size,
        failures
    );

    Ok(AlphaSeries {
        points,
        window_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn short_series_is_all_undefined() {
        let values = vec![1.0; 10];
        let result = alpha_series(&values, 10, &vec![0.1; 10], 1.0, &SpectralConfig::default())
            .unwrap();
        assert_eq!(result.len(), 10);
        assert!(result.points.iter().all(|p| !p.is_defined()));
        assert_eq!(result.summary().n_fits, 0);
        assert!(result.summary().mean.is_nan());
    }

    #[test]
    fn head_is_undefined_and_tail_defined() {
        let mut rng = StdRng::seed_from_u64(7);
        let values: Vec<f64> = (0..80)
            .map(|i| (i as f64 * 0.3).sin() + rng.gen_range(-0.2..0.2))
            .collect();
        let result =
            alpha_series(&values, 32, &vec![0.05; 80], 1.0, &SpectralConfig::default()).unwrap();

        assert_eq!(result.len(), 80);
        for p in &result.points[..32] {
            assert_eq!(*p, AlphaPoint::UNDEFINED);
        }
        for p in &result.points[32..] {
            assert!(p.is_defined());
            assert!(p.alpha >= -2.0 && p.alpha <= 2.0);
        }
    }

    #[test]
    fn random_walk_has_negative_exponent() {
        // Brownian motion has an amplitude spectrum falling roughly as 1/f.
        let mut rng = StdRng::seed_from_u64(42);
        let mut level = 0.0;
        let values: Vec<f64> = (0..300)
            .map(|_| {
                level += rng.gen_range(-1.0..1.0);
                level
            })
            .collect();
        let result =
            alpha_series(&values, 128, &vec![0.5; 300], 1.0, &SpectralConfig::default()).unwrap();
        let summary = result.summary();
        assert!(summary.n_fits > 0);
        assert!(summary.mean < -0.3, "mean alpha {}", summary.mean);
    }

    #[test]
    fn window_is_trailing() {
        // Windows ending before the step see a constant series (all-zero spectrum).
        let mut values = vec![0.0; 40];
        values.extend((0..40).map(|i| (i as f64 * 0.7).sin() * 10.0));
        let result =
            alpha_series(&values, 16, &vec![0.1; 80], 1.0, &SpectralConfig::default()).unwrap();

        // Index 40 is fitted from [24, 40), still all zeros: the best fit has A = 0, the
        // objective is flat in alpha and the fit reports the failure sentinel.
        let p40 = result.points[40];
        assert!(p40.is_defined());
        assert!(!p40.is_usable());
        assert_eq!(p40.alpha, 0.0);
        assert_eq!(p40.error, f64::INFINITY);
        let p60 = result.points[60];
        assert!(p60.is_defined());
        assert_ne!(p40, p60);
    }

    #[test]
    fn deterministic() {
        let values: Vec<f64> = (0..64).map(|i| ((i * 13) % 7) as f64).collect();
        let errs = vec![0.2; 64];
        let a = alpha_series(&values, 16, &errs, 52.0, &SpectralConfig::default()).unwrap();
        let b = alpha_series(&values, 16, &errs, 52.0, &SpectralConfig::default()).unwrap();
        assert_eq!(a.points, b.points);
    }

    #[test]
    fn rejects_bad_inputs() {
        let cfg = SpectralConfig::default();
        assert!(alpha_series(&[1.0; 5], 2, &[0.1; 4], 1.0, &cfg).is_err());
        assert!(alpha_series(&[1.0; 5], 1, &[0.1; 5], 1.0, &cfg).is_err());
        assert!(alpha_series(&[1.0; 5], 2, &[0.1; 5], 0.0, &cfg).is_err());
    }

    #[test]
    fn summary_skips_failed_fits() {
        let series = AlphaSeries {
            points: vec![
                AlphaPoint::UNDEFINED,
                AlphaPoint { alpha: -1.0, error: 0.1 },
                AlphaPoint { alpha: 0.0, error: f64::INFINITY },
                AlphaPoint { alpha: -0.5, error: 0.2 },
            ],
            window_size: 1,
        };
        let s = series.summary();
        assert_eq!(s.n_fits, 2);
        assert_relative_eq!(s.mean, -0.75, epsilon = 1e-12);
        assert_relative_eq!(s.min, -1.0, epsilon = 1e-12);
        assert_relative_eq!(s.max, -0.5, epsilon = 1e-12);
    }
}
