//! Significance regions from paired T² / Q p-value frames.

use super::rate::{flag_rate, RateConfig};
use crate::core::SampleRate;
use crate::error::{MonitorError, Result};
use crate::pca::StatisticFrame;
use chrono::{DateTime, Duration, Utc};

/// Configuration for region extraction.
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// p-value threshold below which a sample is anomalous.
    pub alpha_limit: f64,
    /// A run is reported when `last - first` exceeds this; `-1` keeps single samples.
    pub min_duration: i64,
    /// Leading samples whose flags are forced to zero.
    pub warmup: usize,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            alpha_limit: 1e-2,
            min_duration: 0,
            warmup: 7,
        }
    }
}

impl RegionConfig {
    pub fn alpha_limit(mut self, alpha_limit: f64) -> Self {
        self.alpha_limit = alpha_limit;
        self
    }

    pub fn min_duration(mut self, min_duration: i64) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.alpha_limit > 0.0 && self.alpha_limit <= 1.0) {
            return Err(MonitorError::InvalidParameter(format!(
                "alpha_limit must be in (0, 1], got {}",
                self.alpha_limit
            )));
        }
        if self.min_duration < -1 {
            return Err(MonitorError::InvalidParameter(format!(
                "min_duration must be at least -1, got {}",
                self.min_duration
            )));
        }
        Ok(())
    }
}

/// A run of anomalous samples.
///
/// `start` and `stop` are in sample units, padded by half a sample either side so that
/// adjacent regions tile the axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    /// Index of the first anomalous sample.
    pub first: usize,
    /// Index of the last anomalous sample.
    pub last: usize,
    pub start: f64,
    pub stop: f64,
    /// Samples in the run.
    pub duration: usize,
}

impl Region {
    fn from_run(first: usize, last: usize) -> Self {
        Self {
            first,
            last,
            start: first as f64 - 0.5,
            stop: last as f64 + 0.5,
            duration: last - first + 1,
        }
    }

    pub fn contains(&self, row: usize) -> bool {
        (self.first..=self.last).contains(&row)
    }

    /// Wall-clock bounds for a series starting at `origin` with spacing `interval`.
    pub fn time_bounds(
        &self,
        origin: DateTime<Utc>,
        interval: Duration,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        let at = |offset: f64| {
            let micros = interval.num_microseconds().unwrap_or(i64::MAX) as f64;
            origin + Duration::microseconds((offset * micros).round() as i64)
        };
        (at(self.start), at(self.stop))
    }
}

/// Regions, flags and rate of one p-value frame pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionReport {
    pub regions: Vec<Region>,
    /// 1 inside a region, 0 elsewhere.
    pub flags: Vec<f64>,
    /// Smoothed flag density in events per day.
    pub rates: Vec<f64>,
}

/// Aggregate and feature-specific regions with their rates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedRegions {
    pub regions_all: Vec<Region>,
    pub regions_specific: Vec<Region>,
    pub rates_all: Vec<f64>,
    pub rates_specific: Vec<f64>,
}

/// Per-sample anomaly indicator.
///
/// A sample is anomalous when both aggregate p-values are below `alpha_limit`. With a
/// `feature`, that feature's per-feature p-values must also be below the limit and be
/// the row minimum over the per-feature columns in both frames. Dominance uses exact
/// equality.
pub fn anomaly_mask(
    t2: &StatisticFrame,
    q: &StatisticFrame,
    alpha_limit: f64,
    feature: Option<usize>,
) -> Result<Vec<bool>> {
    if t2.len() != q.len() {
        return Err(MonitorError::DimensionMismatch {
            expected: t2.len(),
            got: q.len(),
        });
    }

    let columns = match feature {
        Some(f) => {
            let t_col = t2
                .feature(f)
                .ok_or_else(|| MonitorError::UnknownFeature(format!("feature index {f}")))?;
            let q_col = q
                .feature(f)
                .ok_or_else(|| MonitorError::UnknownFeature(format!("feature index {f}")))?;
            Some((t_col, q_col))
        }
        None => None,
    };

    let mask = (0..t2.len())
        .map(|row| {
            let aggregate = t2.aggregate()[row] < alpha_limit && q.aggregate()[row] < alpha_limit;
            match columns {
                None => aggregate,
                Some((t_col, q_col)) => {
                    let dominant = t_col[row] == t2.row_min(row) && q_col[row] == q.row_min(row);
                    aggregate && dominant && t_col[row] < alpha_limit && q_col[row] < alpha_limit
                }
            }
        })
        .collect();
    Ok(mask)
}

/// Group consecutive anomalous samples into regions.
///
/// A run is kept when `last - first > min_duration`.
pub fn extract_regions(mask: &[bool], min_duration: i64) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut run_start: Option<usize> = None;

    for (i, &flag) in mask.iter().chain(std::iter::once(&false)).enumerate() {
        match (flag, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(first)) => {
                let last = i - 1;
                if (last - first) as i64 > min_duration {
                    regions.push(Region::from_run(first, last));
                }
                run_start = None;
            }
            _ => {}
        }
    }
    regions
}

/// Binary flag series over `len` samples with the first `warmup` samples cleared.
pub fn region_flags(regions: &[Region], len: usize, warmup: usize) -> Vec<f64> {
    let mut flags = vec![0.0; len];
    for region in regions {
        for flag in flags.iter_mut().take(region.last + 1).skip(region.first) {
            *flag = 1.0;
        }
    }
    for flag in flags.iter_mut().take(warmup) {
        *flag = 0.0;
    }
    flags
}

/// Regions, flags and rates for one frame pair.
pub fn find_regions(
    t2: &StatisticFrame,
    q: &StatisticFrame,
    feature: Option<usize>,
    sample_rate: &SampleRate,
    config: &RegionConfig,
    rate_config: &RateConfig,
) -> Result<RegionReport> {
    config.validate()?;
    let mask = anomaly_mask(t2, q, config.alpha_limit, feature)?;
    let regions = extract_regions(&mask, config.min_duration);
    let flags = region_flags(&regions, mask.len(), config.warmup);
    let rates = flag_rate(
        &flags,
        rate_config.window_samples(sample_rate)?,
        sample_rate.samples_per_day(),
    );
    Ok(RegionReport {
        regions,
        flags,
        rates,
    })
}

/// Aggregate and feature-specific regions and rates.
///
/// When the model keeps every component there is no residual subspace and the Q
/// condition is dropped. Without a `test_feature` the specific output repeats the
/// aggregate one.
///
/// # Example
/// ```
/// use anofox_monitor::core::{SampleRate, SampleUnit};
/// use anofox_monitor::pca::StatisticFrame;
/// use anofox_monitor::regions::{collect_regions, RateConfig, RegionConfig};
///
/// let mut p = vec![0.5; 40];
/// p[10..20].iter_mut().for_each(|x| *x = 1e-4);
/// let frame = StatisticFrame::new(vec!["x".into()], p.clone(), vec![p]).unwrap();
/// let hourly = SampleRate::new(1.0, SampleUnit::Hours).unwrap();
///
/// let out = collect_regions(
///     &frame,
///     &frame,
///     &hourly,
///     1,
///     None,
///     &RegionConfig::default().min_duration(5),
///     &RateConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(out.regions_all.len(), 1);
/// assert_eq!(out.regions_all[0].duration, 10);
/// assert_eq!(out.regions_all[0].start, 9.5);
/// ```
pub fn collect_regions(
    t2: &StatisticFrame,
    q: &StatisticFrame,
    sample_rate: &SampleRate,
    n_components: usize,
    test_feature: Option<&str>,
    config: &RegionConfig,
    rate_config: &RateConfig,
) -> Result<CollectedRegions> {
    let no_residual;
    let q = if n_components == t2.n_features() {
        no_residual = q.filled(0.0);
        &no_residual
    } else {
        q
    };

    let all = find_regions(t2, q, None, sample_rate, config, rate_config)?;
    let specific = match test_feature {
        Some(label) => {
            let index = t2.index_of(label)?;
            find_regions(t2, q, Some(index), sample_rate, config, rate_config)?
        }
        None => all.clone(),
    };

    Ok(CollectedRegions {
        regions_all: all.regions,
        regions_specific: specific.regions,
        rates_all: all.rates,
        rates_specific: specific.rates,
    })
}
