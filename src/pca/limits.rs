//! Confidence limits for Hotelling T² and the Q residual.
//!
//! T² of a new sample scored against a model fitted on `n` samples with `k` retained
//! components follows `(n² - 1) k / (n (n - k)) · F(k, n - k)`. The Q residual uses the
//! Jackson-Mudholkar normal approximation parametrised by the power sums of the
//! discarded eigenvalues, `theta = (Σλ, Σλ², Σλ³)`.
//!
//! Each statistic has a forward map (z-score to control limit) and an inverse map
//! (statistic to upper-tail p-value).

use crate::error::{MonitorError, Result};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};
use statrs::function::erf::erfc;
use std::f64::consts::SQRT_2;

/// Upper-tail probability of the standard normal.
fn normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Lower-tail probability of the standard normal.
fn normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Q-residual limits for one model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLimits {
    theta: [f64; 3],
    h0: f64,
}

impl QLimits {
    pub fn new(theta: [f64; 3]) -> Self {
        let h0 = 1.0 - (2.0 * theta[0] * theta[2]) / (3.0 * theta[1] * theta[1]);
        Self { theta, h0 }
    }

    pub fn theta(&self) -> [f64; 3] {
        self.theta
    }

    /// True when the model keeps every component, leaving no residual subspace.
    pub fn is_degenerate(&self) -> bool {
        self.theta.iter().sum::<f64>() == 0.0
    }

    /// Normal deviate of a Q value; `-inf` for a degenerate model.
    pub fn z_score(&self, q: f64) -> f64 {
        if self.is_degenerate() {
            return f64::NEG_INFINITY;
        }
        let [t1, t2, _] = self.theta;
        let h0 = self.h0;
        let a = (q / t1).powf(h0) - 1.0;
        let b = t2 * h0 * (h0 - 1.0) / t1;
        let c = 1.0 / (h0 * (2.0 * t2).sqrt());
        c * (a * t1 - b)
    }

    /// Upper-tail p-value of a Q value.
    ///
    /// A degenerate model never flags, so its p-value is 1. Non-finite intermediate
    /// results are also reported as 1.
    pub fn p_value(&self, q: f64) -> f64 {
        let p = normal_sf(self.z_score(q));
        if p.is_nan() {
            1.0
        } else {
            p
        }
    }

    /// Q value at normal deviate `z`; `+inf` for a degenerate model.
    pub fn limit(&self, z: f64) -> f64 {
        if self.is_degenerate() {
            return f64::INFINITY;
        }
        let [t1, t2, _] = self.theta;
        let h0 = self.h0;
        let base = 1.0 + z * h0 * (2.0 * t2).sqrt() / t1 + t2 * h0 * (h0 - 1.0) / (t1 * t1);
        t1 * base.powf(1.0 / h0)
    }
}

/// Hotelling T² limits for one model.
#[derive(Debug, Clone)]
pub struct T2Limits {
    n_components: usize,
    n_samples: usize,
    factor: f64,
    dist: FisherSnedecor,
}

impl T2Limits {
    /// Limits for `n_components` retained axes fitted on `n_samples` rows.
    pub fn new(n_components: usize, n_samples: usize) -> Result<Self> {
        if n_components == 0 || n_samples <= n_components {
            return Err(MonitorError::InvalidParameter(format!(
                "T² limits need 0 < n_components < n_samples, got {n_components} and {n_samples}"
            )));
        }
        let k = n_components as f64;
        let n = n_samples as f64;
        let dist = FisherSnedecor::new(k, n - k)
            .map_err(|e| MonitorError::ComputationError(e.to_string()))?;
        Ok(Self {
            n_components,
            n_samples,
            factor: (n * n - 1.0) * k / (n * (n - k)),
            dist,
        })
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Upper-tail p-value of a T² value.
    pub fn p_value(&self, t2: f64) -> f64 {
        if t2.is_nan() || t2 <= 0.0 {
            return 1.0;
        }
        if t2.is_infinite() {
            return 0.0;
        }
        1.0 - self.dist.cdf(t2 / self.factor)
    }

    /// T² value at normal deviate `z`.
    pub fn limit(&self, z: f64) -> f64 {
        let prob = normal_cdf(z);
        if prob <= 0.0 {
            return 0.0;
        }
        if prob >= 1.0 {
            return f64::INFINITY;
        }
        self.dist.inverse_cdf(prob) * self.factor
    }
}

/// Q value at normal deviate `z` for tail power sums `theta`.
pub fn q_limit(z: f64, theta: [f64; 3]) -> f64 {
    QLimits::new(theta).limit(z)
}

/// Upper-tail p-value of `q` for tail power sums `theta`.
pub fn q_p_value(q: f64, theta: [f64; 3]) -> f64 {
    QLimits::new(theta).p_value(q)
}

/// T² value at normal deviate `z`.
pub fn t2_limit(z: f64, n_components: usize, n_samples: usize) -> Result<f64> {
    Ok(T2Limits::new(n_components, n_samples)?.limit(z))
}

/// Upper-tail p-value of `t2`.
pub fn t2_p_value(t2: f64, n_components: usize, n_samples: usize) -> Result<f64> {
    Ok(T2Limits::new(n_components, n_samples)?.p_value(t2))
}
