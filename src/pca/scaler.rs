//! Per-feature standardisation.

use crate::error::{MonitorError, Result};

/// Centres each feature on its mean and divides by its population standard deviation.
///
/// Constant features get a scale of 1 so they map to zero instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major samples; every row must have the same width.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let first = rows.first().ok_or(MonitorError::EmptyData)?;
        let width = first.len();
        if width == 0 {
            return Err(MonitorError::EmptyData);
        }
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(MonitorError::DimensionMismatch {
                expected: width,
                got: bad.len(),
            });
        }

        let n = rows.len() as f64;
        let mut mean = vec![0.0; width];
        for row in rows {
            for (m, &x) in mean.iter_mut().zip(row) {
                *m += x;
            }
        }
        mean.iter_mut().for_each(|m| *m /= n);

        let mut var = vec![0.0; width];
        for row in rows {
            for ((v, &x), &m) in var.iter_mut().zip(row).zip(&mean) {
                *v += (x - m).powi(2);
            }
        }
        let scale = var
            .into_iter()
            .map(|v| {
                let std = (v / n).sqrt();
                if std < 1e-10 {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    /// Standardise one sample.
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((&x, &m), &s)| (x - m) / s)
            .collect()
    }

    /// Map a standardised sample back to the original units.
    pub fn inverse_transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(&self.mean)
            .zip(&self.scale)
            .map(|((&z, &m), &s)| z * s + m)
            .collect()
    }
}
