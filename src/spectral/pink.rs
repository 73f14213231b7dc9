//! Power-law ("pink noise") fit to an amplitude spectrum.
//!
//! The model is `A * f^alpha`, fitted by minimising a weighted chi-square with
//! `A >= 0` and `alpha` in `[-2, 2]`. Parameter errors come from the inverse of half the
//! chi-square Hessian at the optimum.

use crate::error::{MonitorError, Result};
use crate::utils::optimization::{minimize_bounded, numerical_hessian, NelderMeadConfig};
use nalgebra::Matrix2;

/// Lower bound on the power-law exponent.
pub const ALPHA_MIN: f64 = -2.0;
/// Upper bound on the power-law exponent.
pub const ALPHA_MAX: f64 = 2.0;

/// Configuration for spectral fitting.
#[derive(Debug, Clone)]
pub struct SpectralConfig {
    /// Only bins with frequency strictly above this are fitted.
    pub min_frequency: f64,
    /// Starting `[A, alpha]` for the first fit.
    pub initial_guess: [f64; 2],
    /// Relative step for the numerical Hessian.
    pub hessian_step: f64,
    /// Minimiser settings.
    pub optimizer: NelderMeadConfig,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            min_frequency: 0.0,
            initial_guess: [1.0, -1.0],
            hessian_step: 1e-4,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl SpectralConfig {
    pub fn min_frequency(mut self, min_frequency: f64) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    pub fn initial_guess(mut self, amplitude: f64, alpha: f64) -> Self {
        self.initial_guess = [amplitude, alpha];
        self
    }

    pub fn optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_frequency.is_finite() {
            return Err(MonitorError::InvalidParameter(
                "min_frequency must be finite".to_string(),
            ));
        }
        let [a, alpha] = self.initial_guess;
        if !(a.is_finite() && a >= 0.0) || !(ALPHA_MIN..=ALPHA_MAX).contains(&alpha) {
            return Err(MonitorError::InvalidParameter(format!(
                "initial guess [{a}, {alpha}] outside A >= 0, alpha in [-2, 2]"
            )));
        }
        if !(self.hessian_step > 0.0) {
            return Err(MonitorError::InvalidParameter(
                "hessian_step must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fitted power-law parameters.
///
/// A failed fit has both parameters at zero and both errors infinite; check
/// [`PinkNoiseFit::is_valid`] before trusting the values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinkNoiseFit {
    pub amplitude: f64,
    pub alpha: f64,
    pub amplitude_error: f64,
    pub alpha_error: f64,
    /// Chi-square at the optimum.
    pub chi_square: f64,
}

impl PinkNoiseFit {
    /// The "no usable fit" sentinel.
    pub fn failed() -> Self {
        Self {
            amplitude: 0.0,
            alpha: 0.0,
            amplitude_error: f64::INFINITY,
            alpha_error: f64::INFINITY,
            chi_square: f64::NAN,
        }
    }

    /// Whether the fit produced finite parameter errors.
    pub fn is_valid(&self) -> bool {
        self.amplitude_error.is_finite() && self.alpha_error.is_finite()
    }

    pub fn params(&self) -> [f64; 2] {
        [self.amplitude, self.alpha]
    }

    pub fn errors(&self) -> [f64; 2] {
        [self.amplitude_error, self.alpha_error]
    }

    /// Chi-square per degree of freedom for `n_points` fitted bins.
    pub fn reduced_chi_square(&self, n_points: usize) -> f64 {
        if n_points <= 2 {
            return f64::NAN;
        }
        self.chi_square / (n_points - 2) as f64
    }

    /// Model amplitude at frequency `f`.
    pub fn evaluate(&self, f: f64) -> f64 {
        pink_model(f, self.amplitude, self.alpha)
    }
}

/// `A * f^alpha`.
pub fn pink_model(f: f64, amplitude: f64, alpha: f64) -> f64 {
    amplitude * f.powf(alpha)
}

/// Weighted chi-square of the power law against observed amplitudes.
///
/// `errors` holds either one error per bin or a single error shared by all bins.
pub fn chi_square(frequencies: &[f64], amplitudes: &[f64], errors: &[f64], params: &[f64]) -> f64 {
    frequencies
        .iter()
        .zip(amplitudes)
        .enumerate()
        .map(|(i, (&f, &y))| {
            let e = if errors.len() == 1 { errors[0] } else { errors[i] };
            let r = y - pink_model(f, params[0], params[1]);
            r * r / (e * e)
        })
        .sum()
}

/// Fit `A * f^alpha` to an amplitude spectrum.
///
/// `errors` must have one entry per bin or exactly one shared entry. A singular or
/// non-finite Hessian at the optimum yields [`PinkNoiseFit::failed`].
///
/// # Example
/// ```
/// use anofox_monitor::spectral::{fit_pink_noise, SpectralConfig};
///
/// let freqs = [1.0, 2.0, 4.0, 8.0, 16.0];
/// let amps: Vec<f64> = freqs.iter().map(|f| 5.0 / f).collect();
/// let fit = fit_pink_noise(&freqs, &amps, &[0.01], &SpectralConfig::default()).unwrap();
///
/// assert!(fit.is_valid());
/// assert!((fit.alpha + 1.0).abs() < 1e-3);
/// ```
pub fn fit_pink_noise(
    frequencies: &[f64],
    amplitudes: &[f64],
    errors: &[f64],
    config: &SpectralConfig,
) -> Result<PinkNoiseFit> {
    if frequencies.len() != amplitudes.len() {
        return Err(MonitorError::DimensionMismatch {
            expected: frequencies.len(),
            got: amplitudes.len(),
        });
    }
    if errors.len() != 1 && errors.len() != frequencies.len() {
        return Err(MonitorError::DimensionMismatch {
            expected: frequencies.len(),
            got: errors.len(),
        });
    }
    Ok(fit_pink_noise_from(
        frequencies,
        amplitudes,
        errors,
        config.initial_guess,
        config,
    ))
}

/// Fit starting from an explicit guess; inputs are assumed consistent.
pub(crate) fn fit_pink_noise_from(
    frequencies: &[f64],
    amplitudes: &[f64],
    errors: &[f64],
    guess: [f64; 2],
    config: &SpectralConfig,
) -> PinkNoiseFit {
    if frequencies.is_empty() {
        return PinkNoiseFit::failed();
    }

    let objective = |p: &[f64]| chi_square(frequencies, amplitudes, errors, p);
    let bounds = [(0.0, f64::INFINITY), (ALPHA_MIN, ALPHA_MAX)];
    let min = minimize_bounded(objective, &guess, &bounds, &config.optimizer);

    let h = numerical_hessian(objective, &min.point, config.hessian_step);
    let hessian = Matrix2::new(h[0][0], h[0][1], h[1][0], h[1][1]);

    let covariance = if hessian.iter().all(|x| x.is_finite()) && hessian.determinant() != 0.0 {
        (hessian / 2.0).try_inverse()
    } else {
        None
    };

    match covariance {
        Some(cov) if cov.iter().all(|x| x.is_finite()) => PinkNoiseFit {
            amplitude: min.point[0],
            alpha: min.point[1],
            amplitude_error: cov[(0, 0)].abs().sqrt(),
            alpha_error: cov[(1, 1)].abs().sqrt(),
            chi_square: min.value,
        },
        _ => {
            log::warn!(
                "power-law fit over {} bins has a singular or non-finite Hessian",
                frequencies.len()
            );
            PinkNoiseFit::failed()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_noiseless_power_law() {
        let freqs = [1.0, 2.0, 4.0, 8.0, 16.0];
        let amps: Vec<f64> = freqs.iter().map(|&f: &f64| 5.0 * f.powf(-1.0)).collect();
        let fit = fit_pink_noise(&freqs, &amps, &[0.01], &SpectralConfig::default()).unwrap();

        assert!(fit.is_valid());
        assert_relative_eq!(fit.amplitude, 5.0, epsilon = 1e-3);
        assert_relative_eq!(fit.alpha, -1.0, epsilon = 1e-3);
        assert!(fit.amplitude_error < 0.05, "A error {}", fit.amplitude_error);
        assert!(fit.alpha_error < 0.05, "alpha error {}", fit.alpha_error);
        assert!(fit.chi_square < 1e-6);
    }

    #[test]
    fn errors_scale_with_measurement_error() {
        let freqs = [1.0, 2.0, 4.0, 8.0, 16.0];
        let amps: Vec<f64> = freqs.iter().map(|&f| 5.0 / f).collect();
        let tight = fit_pink_noise(&freqs, &amps, &[0.01], &SpectralConfig::default()).unwrap();
        let loose = fit_pink_noise(&freqs, &amps, &[0.1], &SpectralConfig::default()).unwrap();

        // The Hessian scales as 1/err^2, so parameter errors scale linearly.
        assert_relative_eq!(loose.alpha_error / tight.alpha_error, 10.0, epsilon = 0.1);
    }

    #[test]
    fn per_bin_errors_accepted() {
        let freqs = [1.0, 2.0, 3.0, 4.0];
        let amps: Vec<f64> = freqs.iter().map(|&f: &f64| 2.0 * f.powf(0.5)).collect();
        let errs = [0.01, 0.02, 0.01, 0.02];
        let fit = fit_pink_noise(&freqs, &amps, &errs, &SpectralConfig::default()).unwrap();
        assert_relative_eq!(fit.alpha, 0.5, epsilon = 1e-3);
        assert_relative_eq!(fit.amplitude, 2.0, epsilon = 1e-3);
    }

    #[test]
    fn constant_frequency_is_degenerate() {
        // With every bin at f = 1 the objective does not depend on alpha.
        let fit =
            fit_pink_noise(&[1.0, 1.0, 1.0], &[2.0, 2.0, 2.0], &[0.1], &SpectralConfig::default())
                .unwrap();
        assert!(!fit.is_valid());
        assert_eq!(fit.errors(), [f64::INFINITY, f64::INFINITY]);
        assert_eq!(fit.params(), [0.0, 0.0]);
    }

    #[test]
    fn constant_series_spectrum_is_degenerate() {
        // A constant window leaves nothing above f = 0 but zero amplitudes.
        let spectrum = crate::spectral::fourier_transform(&[0.0; 16], 1.0);
        let (freqs, amps) = spectrum.above(0.0);
        assert!(amps.iter().all(|&a| a == 0.0));

        let fit = fit_pink_noise(&freqs, &amps, &[0.1], &SpectralConfig::default()).unwrap();
        assert!(!fit.is_valid());
        assert_eq!(fit.errors(), [f64::INFINITY, f64::INFINITY]);
        assert_eq!(fit.params(), [0.0, 0.0]);
    }

    #[test]
    fn empty_spectrum_fails_softly() {
        let fit = fit_pink_noise(&[], &[], &[1.0], &SpectralConfig::default()).unwrap();
        assert!(!fit.is_valid());
    }

    #[test]
    fn mismatched_errors_rejected() {
        let err = fit_pink_noise(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], &[0.1, 0.1], &SpectralConfig::default())
            .unwrap_err();
        assert!(matches!(err, MonitorError::DimensionMismatch { .. }));
    }

    #[test]
    fn alpha_respects_bounds() {
        // A steeper law than f^-2 pins alpha at the lower bound.
        let freqs = [1.0, 2.0, 4.0, 8.0];
        let amps: Vec<f64> = freqs.iter().map(|&f: &f64| f.powf(-3.0)).collect();
        let fit = fit_pink_noise(&freqs, &amps, &[0.01], &SpectralConfig::default()).unwrap();
        assert!(fit.alpha >= ALPHA_MIN && fit.alpha <= ALPHA_MAX);
        assert!(fit.amplitude >= 0.0);
    }

    #[test]
    fn config_validation() {
        assert!(SpectralConfig::default().validate().is_ok());
        assert!(SpectralConfig::default().initial_guess(1.0, 3.0).validate().is_err());
        assert!(SpectralConfig::default().initial_guess(-1.0, 0.0).validate().is_err());
        assert!(SpectralConfig::default().min_frequency(f64::NAN).validate().is_err());
    }

    #[test]
    fn reduced_chi_square_uses_two_parameters() {
        let fit = PinkNoiseFit {
            amplitude: 1.0,
            alpha: -1.0,
            amplitude_error: 0.1,
            alpha_error: 0.1,
            chi_square: 6.0,
        };
        assert_relative_eq!(fit.reduced_chi_square(5), 2.0, epsilon = 1e-12);
        assert!(fit.reduced_chi_square(2).is_nan());
        assert_relative_eq!(fit.evaluate(4.0), 0.25, epsilon = 1e-12);
    }
}
