//! Summary statistics of a most-probable run-length series.

/// Counts and moments of the most probable run lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLengthSummary {
    /// Steps whose most probable run length is 0, excluding the certain first row.
    pub zeros: usize,
    pub ones: usize,
    pub twos: usize,
    pub max: usize,
    pub mean: f64,
    /// Truncation tolerance the detector ran with.
    pub tol: f64,
}

impl RunLengthSummary {
    pub fn from_run_lengths(run_lengths: &[usize], tol: f64) -> Self {
        let count = |v: usize| run_lengths.iter().filter(|&&r| r == v).count();
        let mean = if run_lengths.is_empty() {
            f64::NAN
        } else {
            run_lengths.iter().sum::<usize>() as f64 / run_lengths.len() as f64
        };

        Self {
            zeros: count(0).saturating_sub(usize::from(!run_lengths.is_empty())),
            ones: count(1),
            twos: count(2),
            max: run_lengths.iter().copied().max().unwrap_or(0),
            mean,
            tol,
        }
    }

    /// Fraction of steps (after the first) that restarted a run.
    pub fn reset_rate(&self, n_steps: usize) -> f64 {
        if n_steps <= 1 {
            return 0.0;
        }
        self.zeros as f64 / (n_steps - 1) as f64
    }
}
