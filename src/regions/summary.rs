//! Headline statistics of a rolling PCA run.

use super::extract::Region;
use crate::pca::RollingPcaResult;
use crate::utils::stats::{nan_max, nan_mean, round_sig};

/// Region count and aggregate p-value moments, rounded to two significant figures.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PcaSummary {
    pub n_components: usize,
    pub n_regions: usize,
    pub t2_mean: f64,
    pub q_mean: f64,
    pub t2_max: f64,
    pub q_max: f64,
    /// Mean explained-variance fraction of the retained axes.
    pub variance_fraction: f64,
}

impl PcaSummary {
    pub fn new(result: &RollingPcaResult, regions: &[Region]) -> Self {
        Self {
            n_components: result.n_components,
            n_regions: regions.len(),
            t2_mean: round_sig(nan_mean(result.t2.aggregate()), 2),
            q_mean: round_sig(nan_mean(result.q.aggregate()), 2),
            t2_max: round_sig(nan_max(result.t2.aggregate()), 2),
            q_max: round_sig(nan_max(result.q.aggregate()), 2),
            variance_fraction: round_sig(result.mean_retained_variance(), 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FeatureFrame;
    use crate::pca::{rolling_pca, PcaConfig};

    #[test]
    fn summarises_rolling_run() {
        let a: Vec<f64> = (0..80).map(|i| (i as f64 * 0.5).sin()).collect();
        let b: Vec<f64> = (0..80).map(|i| (i as f64 * 0.2).cos()).collect();
        let frame = FeatureFrame::new(vec!["a".into(), "b".into()], vec![a, b]).unwrap();
        let result = rolling_pca(&frame, &PcaConfig::default().window(20)).unwrap();

        let summary = PcaSummary::new(&result, &[Region {
            first: 3,
            last: 5,
            start: 2.5,
            stop: 5.5,
            duration: 3,
        }]);
        assert_eq!(summary.n_components, 1);
        assert_eq!(summary.n_regions, 1);
        assert!(summary.t2_mean > 0.0 && summary.t2_mean <= 1.0);
        assert!(summary.q_max <= 1.0);
        assert!(summary.variance_fraction >= 0.5 && summary.variance_fraction <= 1.0);
    }
}
