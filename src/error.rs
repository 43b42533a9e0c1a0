/// Errors raised by the calibration engine and the series controller.
#[derive(Debug, thiserror::Error)]
pub enum CcsError {
    /// Non-numeric or out-of-domain parameter input
    #[error("Invalid parameter: {0}")]
    ParameterValidation(String),

    /// Input table lacks an expected column or has a malformed cell
    #[error("Invalid file format: {0}")]
    FileFormat(String),

    /// No raw row matched any charge-state window
    #[error("No matching data points found")]
    EmptyResult,

    /// Negative base with a fractional exponent, or a log of a non-positive value
    #[error("Numeric domain error: {0}")]
    NumericDomain(String),

    /// Stale or invalid point index
    #[error("Point index {index} out of range (table has {len} points)")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, CcsError>;
