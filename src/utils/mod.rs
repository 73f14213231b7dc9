//! Numerical helpers shared by the analysis modules.

pub mod optimization;
pub mod stats;

pub use optimization::{minimize_bounded, nelder_mead, numerical_hessian, Minimum, NelderMeadConfig};
pub use stats::{argmax, nan_max, nan_mean, nan_min, nan_std, normal_pdf, round_sig};
