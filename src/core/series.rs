//! Series data structures and sample-rate bookkeeping.
//!
//! The analysis cores work on plain slices with index-based windowing. These types sit at
//! the boundary: they validate the caller's data once and carry the sample rate that
//! converts durations into sample counts and frequencies into per-year units.

use crate::error::{MonitorError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Time unit used to express a sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Weeks,
}

impl SampleUnit {
    /// All units, smallest first.
    pub const ALL: [SampleUnit; 5] = [
        SampleUnit::Seconds,
        SampleUnit::Minutes,
        SampleUnit::Hours,
        SampleUnit::Days,
        SampleUnit::Weeks,
    ];

    /// Length of one unit in seconds.
    pub fn seconds(self) -> f64 {
        match self {
            SampleUnit::Seconds => 1.0,
            SampleUnit::Minutes => 60.0,
            SampleUnit::Hours => 3_600.0,
            SampleUnit::Days => 86_400.0,
            SampleUnit::Weeks => 604_800.0,
        }
    }

    /// Number of units in a year (365 days, or 52 weeks).
    pub fn per_year(self) -> f64 {
        match self {
            SampleUnit::Seconds => 3_600.0 * 24.0 * 365.0,
            SampleUnit::Minutes => 60.0 * 24.0 * 365.0,
            SampleUnit::Hours => 24.0 * 365.0,
            SampleUnit::Days => 365.0,
            SampleUnit::Weeks => 52.0,
        }
    }

    /// Parse the unit names accepted by configuration files ("mins", "hour", "weeks", ...).
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "s" | "second" | "seconds" => Ok(SampleUnit::Seconds),
            "mins" | "minute" | "minutes" => Ok(SampleUnit::Minutes),
            "hour" | "hours" => Ok(SampleUnit::Hours),
            "day" | "days" => Ok(SampleUnit::Days),
            "week" | "weeks" => Ok(SampleUnit::Weeks),
            other => Err(MonitorError::InvalidParameter(format!(
                "unknown time unit '{other}'"
            ))),
        }
    }

    /// Express a duration as a number of this unit.
    pub fn count(self, duration: Duration) -> f64 {
        duration_seconds(duration) / self.seconds()
    }

    /// A duration of `n` of this unit.
    pub fn duration(self, n: f64) -> Duration {
        Duration::milliseconds((n * self.seconds() * 1_000.0).round() as i64)
    }
}

/// Sampling interval expressed as `rate` units per sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRate {
    /// Number of `unit`s between consecutive samples.
    pub rate: f64,
    pub unit: SampleUnit,
}

impl SampleRate {
    pub fn new(rate: f64, unit: SampleUnit) -> Result<Self> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(MonitorError::InvalidParameter(format!(
                "sample rate must be positive, got {rate}"
            )));
        }
        Ok(Self { rate, unit })
    }

    /// Pick the unit whose length is closest to the sampling interval.
    pub fn infer(interval: Duration) -> Result<Self> {
        let secs = duration_seconds(interval);
        if !(secs > 0.0) {
            return Err(MonitorError::SampleRateInference(
                "sampling interval must be positive".to_string(),
            ));
        }

        let unit = SampleUnit::ALL
            .iter()
            .copied()
            .min_by(|a, b| {
                let da = (secs / a.seconds() - 1.0).abs();
                let db = (secs / b.seconds() - 1.0).abs();
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(SampleUnit::Seconds);

        Self::new(secs / unit.seconds(), unit)
    }

    /// Duration between consecutive samples.
    pub fn interval(&self) -> Duration {
        self.unit.duration(self.rate)
    }

    /// Number of whole samples in `n` of `unit`.
    pub fn window_size(&self, unit: SampleUnit, n: f64) -> usize {
        let samples = n * unit.seconds() / (self.unit.seconds() * self.rate);
        samples.max(0.0).floor() as usize
    }

    /// Number of whole samples in a duration.
    pub fn samples_in(&self, duration: Duration) -> usize {
        let samples = duration_seconds(duration) / (self.unit.seconds() * self.rate);
        samples.max(0.0).floor() as usize
    }

    /// Samples per year; scales FFT frequencies to cycles per year.
    pub fn samples_per_year(&self) -> f64 {
        self.unit.per_year() / self.rate
    }

    /// Samples per day; scales flag densities to events per day.
    pub fn samples_per_day(&self) -> f64 {
        86_400.0 / (self.unit.seconds() * self.rate)
    }
}

pub(crate) fn duration_seconds(duration: Duration) -> f64 {
    match duration.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

/// A uniformly sampled scalar series with per-point measurement errors.
#[derive(Debug, Clone)]
pub struct Series {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    errors: Vec<f64>,
}

impl Series {
    /// Create a series, rejecting mismatched lengths and non-increasing timestamps.
    pub fn new(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>, errors: Vec<f64>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(MonitorError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        if errors.len() != timestamps.len() {
            return Err(MonitorError::DimensionMismatch {
                expected: timestamps.len(),
                got: errors.len(),
            });
        }
        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(MonitorError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            timestamps,
            values,
            errors,
        })
    }

    /// Create a series with one constant error for every sample.
    pub fn with_constant_error(
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
        error: f64,
    ) -> Result<Self> {
        let errors = vec![error; values.len()];
        Self::new(timestamps, values, errors)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn errors(&self) -> &[f64] {
        &self.errors
    }

    /// Mean of the finite measurement errors.
    pub fn mean_error(&self) -> f64 {
        crate::utils::stats::nan_mean(&self.errors)
    }

    /// Modal spacing between consecutive timestamps.
    pub fn sample_interval(&self) -> Result<Duration> {
        infer_interval(&self.timestamps)
    }

    /// Infer the sample rate from the modal spacing.
    pub fn sample_rate(&self) -> Result<SampleRate> {
        SampleRate::infer(self.sample_interval()?)
    }

    /// First differences of the values with the two sample errors added in quadrature.
    pub fn differenced(&self) -> (Vec<f64>, Vec<f64>) {
        if self.values.len() < 2 {
            return (Vec::new(), Vec::new());
        }
        let diffs = crate::transform::diff(&self.values);
        let errors = self
            .errors
            .windows(2)
            .map(|w| w[0].hypot(w[1]))
            .collect();
        (diffs, errors)
    }
}

/// Infer the modal spacing of a strictly increasing timestamp sequence.
pub fn infer_interval(timestamps: &[DateTime<Utc>]) -> Result<Duration> {
    if timestamps.len() < 2 {
        return Err(MonitorError::InsufficientData {
            needed: 2,
            got: timestamps.len(),
        });
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for w in timestamps.windows(2) {
        let diff = (w[1] - w[0]).num_milliseconds();
        *counts.entry(diff).or_insert(0) += 1;
    }

    // Ties resolve to the shortest spacing so the result is deterministic.
    let (modal_diff, _) = counts
        .iter()
        .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then(db.cmp(da)))
        .map(|(&diff, &count)| (diff, count))
        .ok_or_else(|| MonitorError::SampleRateInference("empty spacing data".to_string()))?;

    if modal_diff <= 0 {
        return Err(MonitorError::SampleRateInference(
            "non-positive modal spacing".to_string(),
        ));
    }

    Ok(Duration::milliseconds(modal_diff))
}

/// Named multivariate features sampled on a shared index.
///
/// Values are stored column-major: `columns[feature][observation]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureFrame {
    labels: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl FeatureFrame {
    /// Create a frame, rejecting ragged columns, label/column count mismatches and
    /// non-finite values.
    pub fn new(labels: Vec<String>, columns: Vec<Vec<f64>>) -> Result<Self> {
        if columns.is_empty() {
            return Err(MonitorError::EmptyData);
        }
        if labels.len() != columns.len() {
            return Err(MonitorError::DimensionMismatch {
                expected: columns.len(),
                got: labels.len(),
            });
        }
        let n = columns[0].len();
        if let Some(bad) = columns.iter().find(|c| c.len() != n) {
            return Err(MonitorError::DimensionMismatch {
                expected: n,
                got: bad.len(),
            });
        }
        if let Some(f) = columns
            .iter()
            .position(|c| c.iter().any(|v| !v.is_finite()))
        {
            return Err(MonitorError::MissingValues(labels[f].clone()));
        }
        Ok(Self { labels, columns })
    }

    /// Build a frame from the values of several aligned series.
    pub fn from_series(labels: Vec<String>, series: &[Series]) -> Result<Self> {
        if let Some(first) = series.first() {
            for s in &series[1..] {
                if s.timestamps() != first.timestamps() {
                    return Err(MonitorError::TimestampError(
                        "series must share timestamps".to_string(),
                    ));
                }
            }
        }
        let columns = series.iter().map(|s| s.values().to_vec()).collect();
        Self::new(labels, columns)
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.len())
    }

    pub fn n_features(&self) -> usize {
        self.columns.len()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn columns(&self) -> &[Vec<f64>] {
        &self.columns
    }

    pub fn column(&self, feature: usize) -> Option<&[f64]> {
        self.columns.get(feature).map(|c| c.as_slice())
    }

    /// Position of a feature label.
    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| MonitorError::UnknownFeature(label.to_string()))
    }

    /// One observation across all features.
    pub fn row(&self, index: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    /// Row-wise first differences; the result has one row fewer.
    pub fn differenced(&self) -> FeatureFrame {
        FeatureFrame {
            labels: self.labels.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| crate::transform::diff(c))
                .collect(),
        }
    }
}
