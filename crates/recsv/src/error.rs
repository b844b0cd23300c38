//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while reformatting CSV text
///
/// None of these are retryable: each one aborts the current run.
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Input that cannot be parsed under the source dialect
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: u64, message: String },

    /// A field that cannot be written under `QUOTE_NONE` without an escape character
    #[error(
        "Cannot write field {column} of row {row} without quoting: {field:?} \
         needs an escape character"
    )]
    UnescapableField {
        row: u64,
        column: usize,
        field: String,
    },

    /// Contradictory dialect parameters
    #[error("Invalid dialect: {0}")]
    InvalidDialect(String),
}

impl CsvError {
    pub(crate) fn malformed<S: Into<String>>(line: u64, message: S) -> Self {
        CsvError::MalformedInput {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_dialect<S: Into<String>>(message: S) -> Self {
        CsvError::InvalidDialect(message.into())
    }
}
