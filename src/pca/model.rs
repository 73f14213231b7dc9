//! PCA model snapshot fitted on one window of standardised samples.

use super::limits::{QLimits, T2Limits};
use super::scaler::StandardScaler;
use crate::error::{MonitorError, Result};
use nalgebra::{DMatrix, SymmetricEigen};

/// T² and Q of one sample together with their p-values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleScore {
    pub t2: f64,
    pub q: f64,
    pub t2_p: f64,
    pub q_p: f64,
}

/// Scaler plus eigendecomposition of one training window.
///
/// Snapshots are immutable; a refit produces a new value.
#[derive(Debug, Clone)]
pub struct PcaModel {
    scaler: StandardScaler,
    /// Mean of the standardised training rows.
    center: Vec<f64>,
    /// Principal axes, row `j` is the axis of the `j`-th largest eigenvalue.
    components: Vec<Vec<f64>>,
    /// Every eigenvalue of the sample covariance, descending.
    explained_variance: Vec<f64>,
    n_components: usize,
    q_limits: QLimits,
    t2_limits: T2Limits,
}

impl PcaModel {
    /// Fit on row-major samples, keeping the `n_components` leading axes.
    pub fn fit(rows: &[Vec<f64>], n_components: usize) -> Result<Self> {
        let scaler = StandardScaler::fit(rows)?;
        let p = scaler.n_features();
        let n = rows.len();
        if n_components == 0 || n_components > p {
            return Err(MonitorError::InvalidParameter(format!(
                "n_components must be in 1..={p}, got {n_components}"
            )));
        }
        if n <= n_components {
            return Err(MonitorError::InsufficientData {
                needed: n_components + 1,
                got: n,
            });
        }

        let scaled: Vec<Vec<f64>> = rows.iter().map(|r| scaler.transform(r)).collect();
        let mut center = vec![0.0; p];
        for row in &scaled {
            for (c, &x) in center.iter_mut().zip(row) {
                *c += x;
            }
        }
        center.iter_mut().for_each(|c| *c /= n as f64);

        let data = DMatrix::from_fn(n, p, |i, j| scaled[i][j] - center[j]);
        let cov = (data.transpose() * &data) / (n as f64 - 1.0);
        let eigen = SymmetricEigen::new(cov);

        let mut order: Vec<usize> = (0..p).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let explained_variance: Vec<f64> =
            order.iter().map(|&j| eigen.eigenvalues[j].max(0.0)).collect();
        let components: Vec<Vec<f64>> = order
            .iter()
            .map(|&j| eigen.eigenvectors.column(j).iter().copied().collect())
            .collect();

        let tail = &explained_variance[n_components..];
        let theta: [f64; 3] = [
            tail.iter().sum(),
            tail.iter().map(|l| l * l).sum(),
            tail.iter().map(|l| l * l * l).sum(),
        ];

        Ok(Self {
            scaler,
            center,
            components,
            explained_variance,
            n_components,
            q_limits: QLimits::new(theta),
            t2_limits: T2Limits::new(n_components, n)?,
        })
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn n_components(&self) -> usize {
        self.n_components
    }

    /// Number of rows the model was fitted on.
    pub fn n_samples(&self) -> usize {
        self.t2_limits.n_samples()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Retained axes (one row per component).
    pub fn loadings(&self) -> &[Vec<f64>] {
        &self.components[..self.n_components]
    }

    /// Retained eigenvalues.
    pub fn eigenvalues(&self) -> &[f64] {
        &self.explained_variance[..self.n_components]
    }

    /// Power sums of the discarded eigenvalues.
    pub fn theta(&self) -> [f64; 3] {
        self.q_limits.theta()
    }

    pub fn q_limits(&self) -> &QLimits {
        &self.q_limits
    }

    pub fn t2_limits(&self) -> &T2Limits {
        &self.t2_limits
    }

    /// Fraction of total variance on every axis, descending.
    pub fn explained_variance_ratio(&self) -> Vec<f64> {
        let total: f64 = self.explained_variance.iter().sum();
        if total > 0.0 {
            self.explained_variance.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.explained_variance.len()]
        }
    }

    /// Fraction of total variance held by the retained axes.
    pub fn retained_variance(&self) -> f64 {
        self.explained_variance_ratio()[..self.n_components].iter().sum()
    }

    /// Standardise a raw sample.
    pub fn scale(&self, row: &[f64]) -> Vec<f64> {
        self.scaler.transform(row)
    }

    /// Scores of a standardised sample on the retained axes.
    pub fn project(&self, scaled: &[f64]) -> Vec<f64> {
        self.loadings()
            .iter()
            .map(|axis| {
                axis.iter()
                    .zip(scaled)
                    .zip(&self.center)
                    .map(|((a, x), c)| a * (x - c))
                    .sum()
            })
            .collect()
    }

    /// Image of `scores` in feature space.
    pub fn reconstruct(&self, scores: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.n_features()];
        for (axis, &s) in self.loadings().iter().zip(scores) {
            for (o, &a) in out.iter_mut().zip(axis) {
                *o += s * a;
            }
        }
        out
    }

    /// Hotelling T² of a score vector.
    pub fn t2_statistic(&self, scores: &[f64]) -> f64 {
        scores
            .iter()
            .zip(self.eigenvalues())
            .map(|(&s, &l)| if s == 0.0 { 0.0 } else { s * s / l })
            .sum()
    }

    /// Q residual: energy of the sample minus energy of its reconstruction.
    pub fn q_statistic(&self, scaled: &[f64], scores: &[f64]) -> f64 {
        let energy: f64 = scaled.iter().map(|x| x * x).sum();
        let recon: f64 = self.reconstruct(scores).iter().map(|x| x * x).sum();
        (energy - recon).abs()
    }

    /// Score an already standardised sample.
    pub fn score_scaled(&self, scaled: &[f64]) -> SampleScore {
        let scores = self.project(scaled);
        let t2 = self.t2_statistic(&scores);
        let q = self.q_statistic(scaled, &scores);
        SampleScore {
            t2,
            q,
            t2_p: self.t2_limits.p_value(t2),
            q_p: self.q_limits.p_value(q),
        }
    }

    /// Score a raw sample.
    pub fn score(&self, row: &[f64]) -> SampleScore {
        self.score_scaled(&self.scale(row))
    }

    /// Score each feature on its own by zeroing every other standardised feature.
    ///
    /// Costs one projection per feature.
    pub fn feature_scores(&self, scaled: &[f64]) -> Vec<SampleScore> {
        let mut single = vec![0.0; scaled.len()];
        (0..scaled.len())
            .map(|i| {
                single[i] = scaled[i];
                let score = self.score_scaled(&single);
                single[i] = 0.0;
                score
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn correlated_rows(n: usize) -> Vec<Vec<f64>> {
        // Two strongly correlated features plus one independent one.
        (0..n)
            .map(|i| {
                let t = i as f64;
                let a = (t * 0.37).sin();
                vec![a, 2.0 * a + 0.01 * (t * 1.3).cos(), (t * 0.91).cos()]
            })
            .collect()
    }

    #[test]
    fn eigenvalues_descending_and_sum_to_feature_count() {
        let rows = correlated_rows(200);
        let model = PcaModel::fit(&rows, 1).unwrap();

        let ratio = model.explained_variance_ratio();
        assert_eq!(ratio.len(), 3);
        assert!(ratio[0] >= ratio[1] && ratio[1] >= ratio[2]);
        assert_relative_eq!(ratio.iter().sum::<f64>(), 1.0, epsilon = 1e-12);

        // Standardised covariance has trace p * n / (n - 1).
        let total: f64 = model.eigenvalues()[0] + model.theta()[0];
        assert_relative_eq!(total, 3.0 * 200.0 / 199.0, epsilon = 1e-9);

        // The correlated pair dominates the first axis.
        assert!(ratio[0] > 0.6);
    }

    #[test]
    fn loadings_are_unit_vectors() {
        let model = PcaModel::fit(&correlated_rows(100), 2).unwrap();
        for axis in model.loadings() {
            let norm: f64 = axis.iter().map(|a| a * a).sum();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn all_components_leave_no_residual() {
        let rows = correlated_rows(100);
        let model = PcaModel::fit(&rows, 3).unwrap();
        assert_eq!(model.theta(), [0.0, 0.0, 0.0]);

        let score = model.score(&rows[10]);
        assert!(score.q < 1e-9);
        assert_eq!(score.q_p, 1.0);
        assert!(score.t2_p > 0.0 && score.t2_p <= 1.0);
    }

    #[test]
    fn outlier_scores_extreme() {
        let rows = correlated_rows(150);
        let model = PcaModel::fit(&rows, 1).unwrap();

        let typical = model.score(&rows[20]);
        // Breaks the correlation between the first two features.
        let outlier = model.score(&[3.0, -6.0, 0.0]);
        assert!(outlier.q > typical.q);
        assert!(outlier.q_p < 1e-3);
    }

    #[test]
    fn feature_scores_one_per_feature() {
        let rows = correlated_rows(80);
        let model = PcaModel::fit(&rows, 1).unwrap();
        let scaled = model.scale(&rows[5]);
        let per_feature = model.feature_scores(&scaled);
        assert_eq!(per_feature.len(), 3);
        for s in &per_feature {
            assert!(s.t2 >= 0.0 && s.q >= 0.0);
            assert!((0.0..=1.0).contains(&s.t2_p));
            assert!((0.0..=1.0).contains(&s.q_p));
        }
    }

    #[test]
    fn rejects_bad_component_counts() {
        let rows = correlated_rows(20);
        assert!(PcaModel::fit(&rows, 0).is_err());
        assert!(PcaModel::fit(&rows, 4).is_err());
        assert!(PcaModel::fit(&rows[..2], 2).is_err());
    }
}
