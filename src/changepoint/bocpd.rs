//! Bayesian Online Changepoint Detection (Adams & MacKay, 2007).
//!
//! Run-length model with an unknown-mean Gaussian likelihood. For each surviving run
//! length hypothesis the predictive mean is the mean of the samples in that run and the
//! predictive scale is the largest measurement error in it (plus `tol` as a floor).
//! After each update the posterior tail whose cumulative mass is below `tol` is dropped,
//! which bounds the work per step to the run lengths that still matter.

use super::posterior::RunLengthPosterior;
use super::summary::RunLengthSummary;
use crate::core::Series;
use crate::error::{MonitorError, Result};
use crate::utils::stats::{argmax, normal_pdf};

/// Configuration for BOCPD.
#[derive(Debug, Clone)]
pub struct BocpdConfig {
    /// Prior probability of a changepoint at each step.
    pub hazard: f64,
    /// Tail-mass truncation tolerance; also the floor added to the predictive scale.
    pub tol: f64,
    /// Maximum run-length index kept in the stored matrix.
    pub max_seq_length: usize,
    /// Multiplier applied to the measurement errors before detection.
    pub error_scale: f64,
}

impl Default for BocpdConfig {
    fn default() -> Self {
        Self {
            hazard: 1.0 / 200.0,
            tol: 1e-10,
            max_seq_length: 24 * 7 * 4,
            error_scale: 1.0,
        }
    }
}

impl BocpdConfig {
    /// Set the changepoint hazard.
    pub fn hazard(mut self, hazard: f64) -> Self {
        self.hazard = hazard;
        self
    }

    /// Set the truncation tolerance.
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the stored run-length limit.
    pub fn max_seq_length(mut self, max_seq_length: usize) -> Self {
        self.max_seq_length = max_seq_length.max(1);
        self
    }

    /// Set the error multiplier.
    pub fn error_scale(mut self, error_scale: f64) -> Self {
        self.error_scale = error_scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.hazard) {
            return Err(MonitorError::InvalidParameter(format!(
                "hazard must be in [0, 1], got {}",
                self.hazard
            )));
        }
        if !(0.0..1.0).contains(&self.tol) {
            return Err(MonitorError::InvalidParameter(format!(
                "tol must be in [0, 1), got {}",
                self.tol
            )));
        }
        if !(self.error_scale.is_finite() && self.error_scale > 0.0) {
            return Err(MonitorError::InvalidParameter(format!(
                "error_scale must be positive, got {}",
                self.error_scale
            )));
        }
        Ok(())
    }
}

/// Result of BOCPD.
#[derive(Debug, Clone)]
pub struct BocpdResult {
    /// Run-length posterior, cut to `width` columns.
    pub posterior: RunLengthPosterior,
    /// Most probable run length at each step.
    pub max_run_lengths: Vec<usize>,
    /// Posterior probability of that run length.
    pub probabilities: Vec<f64>,
    /// Column count of the stored matrix.
    pub width: usize,
}

impl BocpdResult {
    pub fn len(&self) -> usize {
        self.max_run_lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_run_lengths.is_empty()
    }

    /// Dense `len x width` posterior matrix.
    pub fn matrix(&self) -> Vec<Vec<f64>> {
        self.posterior.to_dense(self.width)
    }

    /// Steps where the most probable run length falls, i.e. a new run became likelier.
    pub fn changepoints(&self) -> Vec<usize> {
        self.max_run_lengths
            .windows(2)
            .enumerate()
            .filter(|(_, w)| w[1] < w[0])
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Summary of the most-probable run lengths.
    pub fn summary(&self, tol: f64) -> RunLengthSummary {
        RunLengthSummary::from_run_lengths(&self.max_run_lengths, tol)
    }
}

/// One BOCPD update at step `t`.
///
/// `message` is the posterior of step `t - 1`. Returns the normalised joint over run
/// lengths `0..=message.len()` before tail truncation; it sums to one.
///
/// If every term underflows to zero the likelihood carries no information and the
/// update falls back to the prior growth/changepoint split.
pub fn predictive_step(
    data: &[f64],
    errs: &[f64],
    t: usize,
    message: &[f64],
    config: &BocpdConfig,
) -> Vec<f64> {
    let x = data[t];
    let mut joint = Vec::with_capacity(message.len() + 1);
    joint.push(0.0);

    // Hypothesis i covers samples t-i-1..=t; extend the window backwards one sample
    // per hypothesis and keep running sums.
    let mut sum = x;
    let mut count = 1usize;
    let mut max_err = finite_or(errs[t], 0.0);
    if !x.is_finite() {
        sum = 0.0;
        count = 0;
    }

    for (i, &m) in message.iter().enumerate() {
        if let Some(j) = t.checked_sub(i + 1) {
            if data[j].is_finite() {
                sum += data[j];
                count += 1;
            }
            max_err = max_err.max(finite_or(errs[j], 0.0));
        }
        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        let sig = max_err + config.tol;
        let density = normal_pdf(x, mean, sig);
        joint.push(finite_or(density, 0.0) * m * (1.0 - config.hazard));
    }

    joint[0] = message.iter().sum::<f64>() * config.hazard;

    let total: f64 = joint.iter().sum();
    if total > 0.0 && total.is_finite() {
        joint.iter_mut().for_each(|p| *p /= total);
        return joint;
    }

    log::warn!("BOCPD step {t}: predictive mass underflowed, using prior growth");
    joint[0] = message.iter().sum::<f64>() * config.hazard;
    for (slot, &m) in joint[1..].iter_mut().zip(message) {
        *slot = m * (1.0 - config.hazard);
    }
    let total: f64 = joint.iter().sum();
    if total > 0.0 {
        joint.iter_mut().for_each(|p| *p /= total);
    }
    joint
}

/// Length of the prefix kept after dropping the tail whose mass is below `tol`.
///
/// The retained mass may fall slightly short of one; it is not renormalised.
pub fn truncation_length(joint: &[f64], tol: f64) -> usize {
    let mut tail = 0.0;
    let mut keep = joint.len();
    for (i, &p) in joint.iter().enumerate().rev() {
        tail += p;
        if tail < tol {
            keep = i;
        } else {
            break;
        }
    }
    keep.max(1).min(joint.len())
}

/// Run BOCPD over `data` with per-point errors `errs`.
///
/// Errors are multiplied by `config.error_scale` first. The posterior row count equals
/// `data.len()`; row 0 is the certain run length zero.
///
/// # Example
/// ```
/// use anofox_monitor::changepoint::{bocpd_detect, BocpdConfig};
///
/// let data = [0.0, 0.0, 0.0, 0.0, 10.0, 10.0, 10.0, 10.0];
/// let errs = [0.1; 8];
/// let result = bocpd_detect(&data, &errs, &BocpdConfig::default().hazard(0.1)).unwrap();
///
/// assert_eq!(result.max_run_lengths[4], 0);
/// assert_eq!(result.changepoints(), vec![4]);
/// ```
pub fn bocpd_detect(data: &[f64], errs: &[f64], config: &BocpdConfig) -> Result<BocpdResult> {
    config.validate()?;
    if errs.len() != data.len() {
        return Err(MonitorError::DimensionMismatch {
            expected: data.len(),
            got: errs.len(),
        });
    }

    let n = data.len();
    if n == 0 {
        return Ok(BocpdResult {
            posterior: RunLengthPosterior::default(),
            max_run_lengths: Vec::new(),
            probabilities: Vec::new(),
            width: 0,
        });
    }

    let scaled: Vec<f64> = errs.iter().map(|e| e * config.error_scale).collect();
    let mut posterior = RunLengthPosterior::with_capacity(n, 16);
    let mut max_run_lengths = Vec::with_capacity(n);
    let mut probabilities = Vec::with_capacity(n);

    posterior.push_row(&[1.0]);
    max_run_lengths.push(0);
    probabilities.push(1.0);

    let mut message = vec![1.0];
    for t in 1..n {
        let mut joint = predictive_step(data, &scaled, t, &message, config);
        let keep = truncation_length(&joint, config.tol);
        joint.truncate(keep);

        let r_max = argmax(&joint).unwrap_or(0);
        max_run_lengths.push(r_max);
        probabilities.push(joint[r_max]);
        posterior.push_row(&joint);
        message = joint;
    }

    let longest = posterior.max_row_len();
    let width = if longest.saturating_sub(1) > config.max_seq_length {
        log::debug!(
            "BOCPD: truncating stored run lengths from {} to {}",
            longest,
            config.max_seq_length
        );
        posterior = posterior.truncated(config.max_seq_length);
        config.max_seq_length
    } else {
        longest
    };

    Ok(BocpdResult {
        posterior,
        max_run_lengths,
        probabilities,
        width,
    })
}

/// Run BOCPD on the first differences of a series.
///
/// Each difference carries the errors of its two samples added in quadrature.
pub fn detect_series(series: &Series, config: &BocpdConfig) -> Result<BocpdResult> {
    let (diffs, errors) = series.differenced();
    bocpd_detect(&diffs, &errors, config)
}

fn finite_or(x: f64, fallback: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        fallback
    }
}
