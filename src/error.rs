//! Error types for FTP computation and input loading

use thiserror::Error;

/// Result alias used throughout the engine
pub type FtpResult<T> = Result<T, FtpError>;

/// Errors raised by the FTP engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FtpError {
    /// Input matrices are structurally inconsistent
    #[error("dimension mismatch on '{input}': expected {expected_rows}x{expected_cols}, got {rows}x{cols}")]
    DimensionMismatch {
        /// Name of the offending input
        input: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Method name other than "stock" or "flux"
    #[error("unknown method '{0}', use 'stock' or 'flux'")]
    UnknownMethod(String),

    /// An output was read before a successful compute
    #[error("'{0}' not available, call compute() first")]
    NotComputed(&'static str),

    /// Output name that does not match any of the seven matrices
    #[error("unknown output matrix '{0}'")]
    UnknownOutput(String),

    /// Rate blending policy name not recognised
    #[error("unknown rate blending policy '{0}', use 'own-curve' or 'inherited-layer'")]
    UnknownBlending(String),
}

/// Errors raised while reading or writing matrix files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid number '{value}' at row {row}, column {col}")]
    Parse { value: String, row: usize, col: usize },

    /// Rows of a matrix file have different lengths
    #[error("ragged matrix: row {row} has {got} values, expected {expected}")]
    Ragged { row: usize, expected: usize, got: usize },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
