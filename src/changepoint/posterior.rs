//! Ragged storage for the run-length posterior.
//!
//! Row `t` holds `P(run length = r | x_0..=x_t)` for `r` in `0..len(t)`. Rows have
//! different lengths because each step may add one run length and tail truncation may
//! drop several, so rows live back to back in one buffer with an offset index.

/// Run-length posterior matrix stored as one contiguous buffer plus row offsets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunLengthPosterior {
    values: Vec<f64>,
    /// `offsets[t]..offsets[t + 1]` is row `t`.
    offsets: Vec<usize>,
}

impl RunLengthPosterior {
    /// Empty posterior with room for `rows` rows of about `row_hint` entries.
    pub fn with_capacity(rows: usize, row_hint: usize) -> Self {
        let mut offsets = Vec::with_capacity(rows + 1);
        offsets.push(0);
        Self {
            values: Vec::with_capacity(rows.saturating_mul(row_hint.max(1))),
            offsets,
        }
    }

    /// Append the next time step's distribution.
    pub fn push_row(&mut self, row: &[f64]) {
        if self.offsets.is_empty() {
            self.offsets.push(0);
        }
        self.values.extend_from_slice(row);
        self.offsets.push(self.values.len());
    }

    /// Number of time steps stored.
    pub fn n_rows(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// The valid entries of row `t`.
    pub fn row(&self, t: usize) -> &[f64] {
        &self.values[self.offsets[t]..self.offsets[t + 1]]
    }

    /// Number of valid entries in row `t`.
    pub fn row_len(&self, t: usize) -> usize {
        self.offsets[t + 1] - self.offsets[t]
    }

    /// `P(run length = r)` at step `t`; zero beyond the row's valid length.
    pub fn get(&self, t: usize, r: usize) -> f64 {
        self.row(t).get(r).copied().unwrap_or(0.0)
    }

    /// Longest row length, i.e. the dense column count.
    pub fn max_row_len(&self) -> usize {
        (0..self.n_rows()).map(|t| self.row_len(t)).max().unwrap_or(0)
    }

    /// Iterate over rows in time order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_rows()).map(move |t| self.row(t))
    }

    /// Dense `n_rows x width` copy, zero-padded and cut at `width` columns.
    pub fn to_dense(&self, width: usize) -> Vec<Vec<f64>> {
        self.rows()
            .map(|row| {
                let mut dense = vec![0.0; width];
                let keep = row.len().min(width);
                dense[..keep].copy_from_slice(&row[..keep]);
                dense
            })
            .collect()
    }

    /// Copy with every row cut to at most `width` entries.
    pub fn truncated(&self, width: usize) -> Self {
        let mut out = Self::with_capacity(self.n_rows(), width);
        for row in self.rows() {
            out.push_row(&row[..row.len().min(width)]);
        }
        out
    }

    /// Total retained mass of row `t`.
    pub fn row_mass(&self, t: usize) -> f64 {
        self.row(t).iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ragged_rows_round_trip() {
        let mut r = RunLengthPosterior::with_capacity(3, 2);
        r.push_row(&[1.0]);
        r.push_row(&[0.2, 0.8]);
        r.push_row(&[0.1, 0.3, 0.6]);

        assert_eq!(r.n_rows(), 3);
        assert_eq!(r.row(1), &[0.2, 0.8]);
        assert_eq!(r.row_len(2), 3);
        assert_eq!(r.get(0, 2), 0.0);
        assert_eq!(r.get(2, 2), 0.6);
        assert_eq!(r.max_row_len(), 3);
    }

    #[test]
    fn dense_view_pads_and_cuts() {
        let mut r = RunLengthPosterior::default();
        r.push_row(&[1.0]);
        r.push_row(&[0.1, 0.2, 0.7]);

        let dense = r.to_dense(2);
        assert_eq!(dense, vec![vec![1.0, 0.0], vec![0.1, 0.2]]);

        let cut = r.truncated(2);
        assert_eq!(cut.row(1), &[0.1, 0.2]);
        assert_eq!(cut.row(0), &[1.0]);
        assert_eq!(cut.max_row_len(), 2);
    }

    #[test]
    fn empty_posterior() {
        let r = RunLengthPosterior::default();
        assert!(r.is_empty());
        assert_eq!(r.max_row_len(), 0);
        assert!(r.to_dense(4).is_empty());
    }
}
