//! Rolling window functions and differencing.

/// First differences: `out[i] = series[i + 1] - series[i]`.
///
/// The result is one element shorter than the input (empty for fewer than two points).
pub fn diff(series: &[f64]) -> Vec<f64> {
    series.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Compute rolling mean (moving average).
///
/// Partial windows at the edges are averaged over the points available, so every
/// output is defined for non-empty input.
///
/// # Arguments
/// * `series` - Input time series
/// * `window` - Window size
/// * `center` - If true, center the window; otherwise use a trailing window
pub fn rolling_mean(series: &[f64], window: usize, center: bool) -> Vec<f64> {
    rolling_apply(series, window, center, |s| {
        s.iter().sum::<f64>() / s.len() as f64
    })
}

/// Generic rolling window application.
fn rolling_apply<F>(series: &[f64], window: usize, center: bool, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let n = series.len();
    let mut result = vec![f64::NAN; n];

    for (i, out) in result.iter_mut().enumerate() {
        let (start, end) = if center {
            let half = window / 2;
            let start = i.saturating_sub(half);
            let end = (i + window - half).min(n);
            (start, end)
        } else {
            ((i + 1).saturating_sub(window), i + 1)
        };

        if end > start {
            *out = f(&series[start..end]);
        }
    }

    result
}
