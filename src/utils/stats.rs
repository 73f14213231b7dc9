//! Statistical utility functions.
//!
//! The `nan_*` helpers skip non-finite entries, so sentinel-filled outputs (for example
//! the undefined head of an alpha series) can be summarised directly.

/// Mean of the finite values; NaN when there are none.
pub fn nan_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, c), &x| (s + x, c + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Sample standard deviation (n-1 denominator) of the finite values.
pub fn nan_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if finite.len() < 2 {
        return f64::NAN;
    }
    let m = finite.iter().sum::<f64>() / finite.len() as f64;
    let sum_sq: f64 = finite.iter().map(|x| (x - m).powi(2)).sum();
    (sum_sq / (finite.len() - 1) as f64).sqrt()
}

/// Minimum of the finite values; NaN when there are none.
pub fn nan_min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .fold(f64::NAN, f64::min)
}

/// Maximum of the finite values; NaN when there are none.
pub fn nan_max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .filter(|x| x.is_finite())
        .fold(f64::NAN, f64::max)
}

/// Gaussian probability density.
pub fn normal_pdf(x: f64, mean: f64, sd: f64) -> f64 {
    let z = (x - mean) / sd;
    (-0.5 * z * z).exp() / (sd * (2.0 * std::f64::consts::PI).sqrt())
}

/// Round to `sig` significant figures. Zero and non-finite values pass through.
pub fn round_sig(x: f64, sig: u32) -> f64 {
    if x == 0.0 || !x.is_finite() {
        return x;
    }
    let digits = sig as i32 - 1 - x.abs().log10().floor() as i32;
    let factor = 10f64.powi(digits);
    (x * factor).round() / factor
}

/// Index of the largest value; the first one wins ties. `None` for empty input.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ if v.is_nan() => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn nan_mean_skips_sentinels() {
        let values = [f64::NEG_INFINITY, 1.0, f64::NAN, 3.0];
        assert_relative_eq!(nan_mean(&values), 2.0, epsilon = 1e-12);
        assert!(nan_mean(&[]).is_nan());
        assert!(nan_mean(&[f64::NAN]).is_nan());
    }

    #[test]
    fn nan_std_is_sample_std() {
        assert_relative_eq!(
            nan_std(&[1.0, 2.0, 3.0, 4.0, 5.0, f64::NAN]),
            2.5_f64.sqrt(),
            epsilon = 1e-12
        );
        assert!(nan_std(&[1.0]).is_nan());
    }

    #[test]
    fn nan_min_max() {
        let values = [f64::NEG_INFINITY, -2.0, 5.0, f64::NAN];
        assert_eq!(nan_min(&values), -2.0);
        assert_eq!(nan_max(&values), 5.0);
        assert!(nan_max(&[]).is_nan());
    }

    #[test]
    fn normal_pdf_peak() {
        assert_relative_eq!(
            normal_pdf(0.0, 0.0, 1.0),
            1.0 / (2.0 * std::f64::consts::PI).sqrt(),
            epsilon = 1e-12
        );
        assert_relative_eq!(normal_pdf(3.0, 1.0, 2.0), normal_pdf(-1.0, 1.0, 2.0), epsilon = 1e-15);
    }

    #[test]
    fn round_sig_two_figures() {
        assert_relative_eq!(round_sig(1234.0, 2), 1200.0, epsilon = 1e-9);
        assert_relative_eq!(round_sig(0.012345, 2), 0.012, epsilon = 1e-12);
        assert_relative_eq!(round_sig(-5.678, 2), -5.7, epsilon = 1e-12);
        assert_eq!(round_sig(0.0, 2), 0.0);
        assert!(round_sig(f64::INFINITY, 2).is_infinite());
    }

    #[test]
    fn argmax_first_tie_wins() {
        assert_eq!(argmax(&[0.1, 0.5, 0.5, 0.2]), Some(1));
        assert_eq!(argmax(&[1.0]), Some(0));
        assert_eq!(argmax(&[]), None);
    }
}
