//! Rolling-window PCA scoring.
//!
//! The input frame is first differenced. A model is fitted on the first `window` rows
//! and scores every row up to and including row `window`. After scoring each later
//! multiple of `window` a fresh model is fitted on the `window` rows ending there, and
//! it scores from the following row on. Apart from the first window, each row is scored
//! by a model that was fitted without seeing it.

use super::model::PcaModel;
use crate::core::FeatureFrame;
use crate::error::{MonitorError, Result};

/// Configuration for rolling PCA.
#[derive(Debug, Clone)]
pub struct PcaConfig {
    /// Number of retained principal components.
    pub n_components: usize,
    /// Rows per training window; also the refit period.
    pub window: usize,
}

impl Default for PcaConfig {
    fn default() -> Self {
        Self {
            n_components: 1,
            window: 24 * 7,
        }
    }
}

impl PcaConfig {
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Check the configuration against a frame with `n_features` columns.
    pub fn validate(&self, n_features: usize) -> Result<()> {
        if self.n_components == 0 || self.n_components > n_features {
            return Err(MonitorError::InvalidParameter(format!(
                "n_components must be in 1..={n_features}, got {}",
                self.n_components
            )));
        }
        if self.window <= self.n_components {
            return Err(MonitorError::InvalidParameter(format!(
                "window ({}) must exceed n_components ({})",
                self.window, self.n_components
            )));
        }
        Ok(())
    }
}

/// Per-row p-values: one aggregate column and one column per feature.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticFrame {
    labels: Vec<String>,
    aggregate: Vec<f64>,
    /// Column-major, `per_feature[f][row]`.
    per_feature: Vec<Vec<f64>>,
}

impl StatisticFrame {
    /// Build a frame; every column must match the aggregate length.
    pub fn new(labels: Vec<String>, aggregate: Vec<f64>, per_feature: Vec<Vec<f64>>) -> Result<Self> {
        if labels.len() != per_feature.len() {
            return Err(MonitorError::DimensionMismatch {
                expected: labels.len(),
                got: per_feature.len(),
            });
        }
        if let Some(col) = per_feature.iter().find(|c| c.len() != aggregate.len()) {
            return Err(MonitorError::DimensionMismatch {
                expected: aggregate.len(),
                got: col.len(),
            });
        }
        Ok(Self {
            labels,
            aggregate,
            per_feature,
        })
    }

    fn with_rows(labels: &[String], rows: usize) -> Self {
        Self {
            labels: labels.to_vec(),
            aggregate: vec![0.0; rows],
            per_feature: vec![vec![0.0; rows]; labels.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.aggregate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aggregate.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn n_features(&self) -> usize {
        self.labels.len()
    }

    pub fn aggregate(&self) -> &[f64] {
        &self.aggregate
    }

    pub fn feature(&self, index: usize) -> Option<&[f64]> {
        self.per_feature.get(index).map(Vec::as_slice)
    }

    pub fn index_of(&self, label: &str) -> Result<usize> {
        self.labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| MonitorError::UnknownFeature(label.to_string()))
    }

    /// Smallest per-feature p-value at `row`.
    pub fn row_min(&self, row: usize) -> f64 {
        self.per_feature
            .iter()
            .map(|c| c[row])
            .fold(f64::INFINITY, f64::min)
    }

    /// Copy with every p-value (aggregate and per feature) replaced by `value`.
    pub fn filled(&self, value: f64) -> Self {
        Self {
            labels: self.labels.clone(),
            aggregate: vec![value; self.len()],
            per_feature: vec![vec![value; self.len()]; self.n_features()],
        }
    }
}

/// A model snapshot and the first row it scored.
#[derive(Debug, Clone)]
pub struct ModelEpoch {
    pub start_row: usize,
    pub model: PcaModel,
}

/// Output of [`rolling_pca`], indexed by differenced row.
#[derive(Debug, Clone)]
pub struct RollingPcaResult {
    /// Differenced rows standardised by the active model.
    pub scaled: FeatureFrame,
    /// Hotelling T² p-values.
    pub t2: StatisticFrame,
    /// Q-residual p-values.
    pub q: StatisticFrame,
    /// Explained-variance fraction of every axis under the active model.
    pub variances: Vec<Vec<f64>>,
    /// Model history in scoring order.
    pub epochs: Vec<ModelEpoch>,
    pub n_components: usize,
    pub window: usize,
}

impl RollingPcaResult {
    pub fn len(&self) -> usize {
        self.t2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t2.is_empty()
    }

    /// Model that scored `row`.
    pub fn model_at(&self, row: usize) -> Option<&PcaModel> {
        self.epochs
            .iter()
            .rev()
            .find(|e| e.start_row <= row)
            .map(|e| &e.model)
    }

    /// Mean explained-variance fraction of the retained axes over all rows.
    pub fn mean_retained_variance(&self) -> f64 {
        if self.variances.is_empty() {
            return f64::NAN;
        }
        let total: f64 = self
            .variances
            .iter()
            .map(|v| v[..self.n_components.min(v.len())].iter().sum::<f64>())
            .sum();
        total / self.variances.len() as f64
    }
}

/// Score every differenced row of `frame` with a periodically refitted PCA model.
///
/// Returns empty frames (with a warning) when fewer than `window` differenced rows are
/// available.
///
/// # Example
/// ```
/// use anofox_monitor::core::FeatureFrame;
/// use anofox_monitor::pca::{rolling_pca, PcaConfig};
///
/// let a: Vec<f64> = (0..120).map(|i| (i as f64 * 0.3).sin()).collect();
/// let b: Vec<f64> = a.iter().map(|x| 2.0 * x + 1.0).collect();
/// let c: Vec<f64> = (0..120).map(|i| (i as f64 * 0.7).cos()).collect();
/// let frame = FeatureFrame::new(
///     vec!["a".into(), "b".into(), "c".into()],
///     vec![a, b, c],
/// ).unwrap();
///
/// let result = rolling_pca(&frame, &PcaConfig::default().window(40)).unwrap();
/// assert_eq!(result.len(), 119);
/// assert_eq!(result.epochs.len(), 3);
/// ```
pub fn rolling_pca(frame: &FeatureFrame, config: &PcaConfig) -> Result<RollingPcaResult> {
    config.validate(frame.n_features())?;

    let diffed = frame.differenced();
    let labels = diffed.labels().to_vec();
    let rows: Vec<Vec<f64>> = (0..diffed.n_rows()).map(|i| diffed.row(i)).collect();
    let n_rows = rows.len();
    let n_features = labels.len();
    let window = config.window;

    if n_rows < window {
        log::warn!(
            "rolling PCA: {} differenced rows, need at least {} for one window",
            n_rows,
            window
        );
        return Ok(RollingPcaResult {
            scaled: FeatureFrame::new(labels.clone(), vec![Vec::new(); n_features])?,
            t2: StatisticFrame::with_rows(&labels, 0),
            q: StatisticFrame::with_rows(&labels, 0),
            variances: Vec::new(),
            epochs: Vec::new(),
            n_components: config.n_components,
            window,
        });
    }

    let mut scaled_cols = vec![vec![0.0; n_rows]; n_features];
    let mut t2 = StatisticFrame::with_rows(&labels, n_rows);
    let mut q = StatisticFrame::with_rows(&labels, n_rows);
    let mut variances = Vec::with_capacity(n_rows);
    let mut epochs: Vec<ModelEpoch> = Vec::with_capacity(n_rows / window + 1);

    let mut model = PcaModel::fit(&rows[..window], config.n_components)?;
    let mut model_start = 0;
    let mut ratio = model.explained_variance_ratio();
    log::debug!(
        "rolling PCA: initial fit on rows 0..{}, retained variance {:.3}",
        window,
        model.retained_variance()
    );

    for (h, row) in rows.iter().enumerate() {
        let scaled = model.scale(row);
        let total = model.score_scaled(&scaled);
        t2.aggregate[h] = total.t2_p;
        q.aggregate[h] = total.q_p;

        for (f, score) in model.feature_scores(&scaled).into_iter().enumerate() {
            t2.per_feature[f][h] = score.t2_p;
            q.per_feature[f][h] = score.q_p;
        }
        for (col, &x) in scaled_cols.iter_mut().zip(&scaled) {
            col[h] = x;
        }
        variances.push(ratio.clone());

        // The trailing window ends at the row just scored; the new model starts next row.
        if h >= window && h % window == 0 && h + 1 < n_rows {
            let refit = PcaModel::fit(&rows[h + 1 - window..=h], config.n_components)?;
            log::debug!(
                "rolling PCA: refit on rows {}..={}, retained variance {:.3}",
                h + 1 - window,
                h,
                refit.retained_variance()
            );
            let previous = std::mem::replace(&mut model, refit);
            epochs.push(ModelEpoch {
                start_row: model_start,
                model: previous,
            });
            model_start = h + 1;
            ratio = model.explained_variance_ratio();
        }
    }

    epochs.push(ModelEpoch {
        start_row: model_start,
        model,
    });

    Ok(RollingPcaResult {
        scaled: FeatureFrame::new(labels, scaled_cols)?,
        t2,
        q,
        variances,
        epochs,
        n_components: config.n_components,
        window,
    })
}
