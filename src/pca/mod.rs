//! Rolling principal component analysis for multivariate anomaly scoring.
//!
//! Every row of a differenced feature frame is scored against a PCA model fitted on a
//! preceding window:
//!
//! - **Hotelling T²** measures how far the row sits inside the retained subspace.
//! - **Q residual** measures the energy left outside it.
//!
//! Both are reported as upper-tail p-values (small means anomalous), once for the whole
//! row and once per feature with all other features zeroed, which attributes an anomaly
//! to the variable driving it.

pub mod limits;
pub mod model;
pub mod rolling;
pub mod scaler;

pub use limits::{q_limit, q_p_value, t2_limit, t2_p_value, QLimits, T2Limits};
pub use model::{PcaModel, SampleScore};
pub use rolling::{rolling_pca, ModelEpoch, PcaConfig, RollingPcaResult, StatisticFrame};
pub use scaler::StandardScaler;
