use thiserror::Error;

/// Error types for the emaxfit-rs library.
///
/// Only conditions a caller must fix before invoking the engine are errors.
/// Numerical degeneracy (non-positive-definite covariance, failed Cholesky)
/// is handled inside each component with a documented fallback value instead,
/// and parameters outside the admissible box are clamped, not rejected.
#[derive(Error, Debug)]
pub enum EmaxFitError {
    /// Error indicating a mismatch in sequence lengths.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Invalid input data.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error for invalid parameter values.
    #[error("Invalid parameter value: {0}")]
    InvalidParameter(String),
}

/// Result type alias for emaxfit-rs operations.
pub type Result<T> = std::result::Result<T, EmaxFitError>;
