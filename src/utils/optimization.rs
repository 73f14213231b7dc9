//! Bounded derivative-free minimisation and numerical curvature.
//!
//! The spectral fit needs a box-constrained minimiser for a two-parameter objective and
//! the Hessian at the optimum for error propagation; both live here.

use std::cmp::Ordering;

/// Outcome of a minimisation.
#[derive(Debug, Clone)]
pub struct Minimum {
    /// Best point found.
    pub point: Vec<f64>,
    /// Objective value at `point`.
    pub value: f64,
    /// Iterations performed across all restarts.
    pub iterations: usize,
    /// Whether the final run met the tolerance before `max_iter`.
    pub converged: bool,
}

/// Configuration for Nelder-Mead optimization.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations per run.
    pub max_iter: usize,
    /// Convergence tolerance on the simplex value spread and size.
    pub tolerance: f64,
    /// Reflection coefficient.
    pub alpha: f64,
    /// Expansion coefficient.
    pub gamma: f64,
    /// Contraction coefficient.
    pub rho: f64,
    /// Shrinkage coefficient.
    pub sigma: f64,
    /// Initial simplex step, relative to the coordinate magnitude.
    pub initial_step: f64,
    /// Extra runs restarted from the previous optimum. A collapsed simplex can stall
    /// short of the minimum; restarting rebuilds it around the current best point.
    pub restarts: usize,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2000,
            tolerance: 1e-12,
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            initial_step: 0.05,
            restarts: 2,
        }
    }
}

impl NelderMeadConfig {
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn restarts(mut self, restarts: usize) -> Self {
        self.restarts = restarts;
        self
    }
}

/// Minimise `objective` inside the box `bounds`, starting from `initial`.
///
/// Points are clamped into the box after every simplex move. `bounds` may hold
/// infinite limits for one-sided constraints.
///
/// # Example
/// ```
/// use anofox_monitor::utils::optimization::{minimize_bounded, NelderMeadConfig};
///
/// // Minimise (x-2)^2 + (y-3)^2 with y capped at 1
/// let min = minimize_bounded(
///     |p| (p[0] - 2.0).powi(2) + (p[1] - 3.0).powi(2),
///     &[0.0, 0.0],
///     &[(f64::NEG_INFINITY, f64::INFINITY), (f64::NEG_INFINITY, 1.0)],
///     &NelderMeadConfig::default(),
/// );
///
/// assert!((min.point[0] - 2.0).abs() < 1e-4);
/// assert!((min.point[1] - 1.0).abs() < 1e-4);
/// ```
pub fn minimize_bounded<F>(
    objective: F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &NelderMeadConfig,
) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let mut best = nelder_mead(&objective, initial, bounds, config);
    for _ in 0..config.restarts {
        let next = nelder_mead(&objective, &best.point, bounds, config);
        let improved = best.value - next.value;
        let iterations = best.iterations + next.iterations;
        if next.value <= best.value {
            best = Minimum { iterations, ..next };
        } else {
            best.iterations = iterations;
        }
        if !(improved > config.tolerance) {
            break;
        }
    }
    best
}

/// One Nelder-Mead run.
#[allow(clippy::needless_range_loop)]
pub fn nelder_mead<F>(
    objective: &F,
    initial: &[f64],
    bounds: &[(f64, f64)],
    config: &NelderMeadConfig,
) -> Minimum
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    if n == 0 {
        return Minimum {
            point: vec![],
            value: f64::NAN,
            iterations: 0,
            converged: false,
        };
    }

    let start = clamp_to(initial, bounds);
    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(start.clone());
    for i in 0..n {
        let mut vertex = start.clone();
        let step = if start[i].abs() > 1e-10 {
            config.initial_step * start[i].abs()
        } else {
            config.initial_step
        };
        vertex[i] += step;
        // Step inwards when the outward step is clipped flat against a bound.
        let mut clamped = clamp_to(&vertex, bounds);
        if clamped[i] == start[i] {
            vertex[i] = start[i] - step;
            clamped = clamp_to(&vertex, bounds);
        }
        simplex.push(clamped);
    }

    let mut values: Vec<f64> = simplex.iter().map(|v| objective(v)).collect();
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iter {
        iterations += 1;

        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| total_cmp_nan_last(values[a], values[b]));
        let best = order[0];
        let worst = order[n];
        let second_worst = order[n - 1];

        let centroid = centroid_without(&simplex, worst);
        let spread = values[worst] - values[best];
        let size = simplex
            .iter()
            .map(|v| distance(v, &centroid))
            .fold(0.0, f64::max);
        if spread < config.tolerance || size < config.tolerance {
            converged = true;
            break;
        }

        let reflected = clamp_to(&towards(&centroid, &simplex[worst], -config.alpha), bounds);
        let f_reflected = objective(&reflected);

        if f_reflected < values[best] {
            let expanded = clamp_to(&towards(&centroid, &reflected, config.gamma), bounds);
            let f_expanded = objective(&expanded);
            if f_expanded < f_reflected {
                simplex[worst] = expanded;
                values[worst] = f_expanded;
            } else {
                simplex[worst] = reflected;
                values[worst] = f_reflected;
            }
            continue;
        }

        if f_reflected < values[second_worst] {
            simplex[worst] = reflected;
            values[worst] = f_reflected;
            continue;
        }

        let (contracted, accept_at) = if f_reflected < values[worst] {
            (towards(&centroid, &reflected, config.rho), f_reflected)
        } else {
            (towards(&centroid, &simplex[worst], config.rho), values[worst])
        };
        let contracted = clamp_to(&contracted, bounds);
        let f_contracted = objective(&contracted);
        if f_contracted < accept_at {
            simplex[worst] = contracted;
            values[worst] = f_contracted;
            continue;
        }

        let anchor = simplex[best].clone();
        for i in 0..=n {
            if i == best {
                continue;
            }
            let shrunk = towards(&anchor, &simplex[i], config.sigma);
            simplex[i] = clamp_to(&shrunk, bounds);
            values[i] = objective(&simplex[i]);
        }
    }

    let best = (0..=n)
        .min_by(|&a, &b| total_cmp_nan_last(values[a], values[b]))
        .unwrap_or(0);

    Minimum {
        point: simplex[best].clone(),
        value: values[best],
        iterations,
        converged,
    }
}

/// Central-difference Hessian of `f` at `x`.
///
/// Step sizes scale with each coordinate's magnitude, `h_i = step * max(|x_i|, 1)`.
#[allow(clippy::needless_range_loop)]
pub fn numerical_hessian<F>(f: F, x: &[f64], step: f64) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x.len();
    let h: Vec<f64> = x.iter().map(|xi| step * xi.abs().max(1.0)).collect();
    let mut hess = vec![vec![0.0; n]; n];
    let mut p = x.to_vec();
    let f0 = f(x);

    for i in 0..n {
        p[i] = x[i] + h[i];
        let f_plus = f(&p);
        p[i] = x[i] - h[i];
        let f_minus = f(&p);
        p[i] = x[i];
        hess[i][i] = (f_plus - 2.0 * f0 + f_minus) / (h[i] * h[i]);

        for j in (i + 1)..n {
            let mut corner = |di: f64, dj: f64| {
                p[i] = x[i] + di * h[i];
                p[j] = x[j] + dj * h[j];
                let v = f(&p);
                p[i] = x[i];
                p[j] = x[j];
                v
            };
            let fpp = corner(1.0, 1.0);
            let fpm = corner(1.0, -1.0);
            let fmp = corner(-1.0, 1.0);
            let fmm = corner(-1.0, -1.0);
            let hij = (fpp - fpm - fmp + fmm) / (4.0 * h[i] * h[j]);
            hess[i][j] = hij;
            hess[j][i] = hij;
        }
    }

    hess
}

fn total_cmp_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

fn centroid_without(simplex: &[Vec<f64>], exclude: usize) -> Vec<f64> {
    let n = simplex[0].len();
    let count = (simplex.len() - 1) as f64;
    let mut centroid = vec![0.0; n];
    for (_, vertex) in simplex.iter().enumerate().filter(|(i, _)| *i != exclude) {
        for (c, v) in centroid.iter_mut().zip(vertex) {
            *c += v;
        }
    }
    centroid.iter_mut().for_each(|c| *c /= count);
    centroid
}

/// `origin + t * (point - origin)`; negative `t` reflects through `origin`.
fn towards(origin: &[f64], point: &[f64], t: f64) -> Vec<f64> {
    origin
        .iter()
        .zip(point)
        .map(|(o, p)| o + t * (p - o))
        .collect()
}

fn clamp_to(point: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    point
        .iter()
        .enumerate()
        .map(|(i, &x)| match bounds.get(i) {
            Some(&(lo, hi)) => x.clamp(lo, hi),
            None => x,
        })
        .collect()
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}
