//! Error types for the anofox-monitor library.

use thiserror::Error;

/// Result type alias for monitoring operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors raised at the library boundary.
///
/// The numerical cores never produce these for well-formed input; degenerate fits and
/// degenerate PCA tails are recovered locally and reported through their result values.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between paired inputs.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Non-finite values where every value must be finite.
    #[error("missing values detected in feature {0}")]
    MissingValues(String),

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Sample rate inference failed.
    #[error("could not infer sample rate: {0}")]
    SampleRateInference(String),

    /// A named feature is not present in a frame.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}
