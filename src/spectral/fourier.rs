//! Discrete Fourier transform of an evenly spaced series.

use rustfft::{num_complex::Complex64, FftPlanner};

/// Full two-sided spectrum of a real signal.
///
/// Entries follow FFT ordering: non-negative frequencies first, then the negative ones.
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// Frequency of each bin in cycles per chosen unit.
    pub frequencies: Vec<f64>,
    /// Amplitude spectrum, `2|X_k| / N`.
    pub amplitudes: Vec<f64>,
    /// Phase of each bin in radians.
    pub phases: Vec<f64>,
}

impl Spectrum {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Frequencies and amplitudes of the bins strictly above `min_frequency`.
    ///
    /// With a non-negative cutoff this drops the DC bin and the negative half.
    pub fn above(&self, min_frequency: f64) -> (Vec<f64>, Vec<f64>) {
        self.frequencies
            .iter()
            .zip(&self.amplitudes)
            .filter(|(f, _)| **f > min_frequency)
            .map(|(&f, &a)| (f, a))
            .unzip()
    }
}

/// Compute the FFT of a real-valued signal.
///
/// Returns every complex bin `0..N`.
pub fn fft_real(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);
    buffer
}

/// Sample frequencies of an `n`-point FFT with `samples_per_unit` samples per unit.
///
/// Bin `k` maps to `k * samples_per_unit / n` for the first `ceil(n/2)` bins and to
/// `(k - n) * samples_per_unit / n` for the rest.
pub fn fft_frequencies(n: usize, samples_per_unit: f64) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let scale = samples_per_unit / n as f64;
    let positive = n.div_ceil(2);
    (0..n)
        .map(|k| {
            if k < positive {
                k as f64 * scale
            } else {
                (k as f64 - n as f64) * scale
            }
        })
        .collect()
}

/// Fourier transform of `values` sampled `samples_per_unit` times per unit.
///
/// # Example
/// ```
/// use anofox_monitor::spectral::fourier_transform;
///
/// // Hourly samples, frequencies in cycles per day
/// let values: Vec<f64> = (0..48)
///     .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 24.0).cos())
///     .collect();
/// let spectrum = fourier_transform(&values, 24.0);
///
/// // One cycle per day with unit amplitude
/// assert!((spectrum.frequencies[2] - 1.0).abs() < 1e-12);
/// assert!((spectrum.amplitudes[2] - 1.0).abs() < 1e-9);
/// ```
pub fn fourier_transform(values: &[f64], samples_per_unit: f64) -> Spectrum {
    let n = values.len();
    if n == 0 {
        return Spectrum::default();
    }

    let bins = fft_real(values);
    let norm = 2.0 / n as f64;

    Spectrum {
        frequencies: fft_frequencies(n, samples_per_unit),
        amplitudes: bins.iter().map(|c| norm * c.norm()).collect(),
        phases: bins.iter().map(|c| c.arg()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn generate_sine(n: usize, period: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period as f64).sin())
            .collect()
    }

    #[test]
    fn frequencies_even_length() {
        let f = fft_frequencies(4, 1.0);
        assert_eq!(f, vec![0.0, 0.25, -0.5, -0.25]);
    }

    #[test]
    fn frequencies_odd_length_scaled() {
        let f = fft_frequencies(5, 10.0);
        assert_eq!(f, vec![0.0, 2.0, 4.0, -4.0, -2.0]);
    }

    #[test]
    fn pure_sine_amplitude_and_phase() {
        let signal = generate_sine(128, 16);
        let spectrum = fourier_transform(&signal, 1.0);

        assert_eq!(spectrum.len(), 128);
        // Bin 8 is one cycle per 16 samples.
        assert_relative_eq!(spectrum.frequencies[8], 1.0 / 16.0, epsilon = 1e-15);
        assert_relative_eq!(spectrum.amplitudes[8], 1.0, epsilon = 1e-9);
        // sin has phase -pi/2 relative to cos.
        assert_relative_eq!(spectrum.phases[8], -std::f64::consts::FRAC_PI_2, epsilon = 1e-9);

        for (k, &a) in spectrum.amplitudes.iter().enumerate() {
            if k != 8 && k != 120 {
                assert!(a < 1e-9, "leakage at bin {k}: {a}");
            }
        }
    }

    #[test]
    fn constant_signal_is_all_dc() {
        let spectrum = fourier_transform(&[5.0; 16], 1.0);
        assert_relative_eq!(spectrum.amplitudes[0], 10.0, epsilon = 1e-12);
        let (f, a) = spectrum.above(0.0);
        assert_eq!(f.len(), 7);
        assert!(a.iter().all(|&x| x < 1e-12));
    }

    #[test]
    fn above_cutoff_filters_bins() {
        let spectrum = fourier_transform(&generate_sine(32, 8), 32.0);
        let (f, a) = spectrum.above(4.0);
        assert_eq!(f.len(), a.len());
        assert!(f.iter().all(|&x| x > 4.0));
        assert_eq!(f.first().copied(), Some(5.0));
    }

    #[test]
    fn empty_input() {
        assert!(fourier_transform(&[], 1.0).is_empty());
        assert!(fft_real(&[]).is_empty());
    }
}
