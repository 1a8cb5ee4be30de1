//! Frame Loading Error Types

use thiserror::Error;

/// Errors while reading raw sensor rows
#[derive(Debug, Error)]
pub enum FrameError {
    /// Underlying file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Row does not carry the fixed column schema
    #[error("Line {line}: expected at least {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// Identifier columns are not valid integers
    #[error("Line {line}: invalid row: {reason}")]
    InvalidRow { line: usize, reason: String },

    /// Non-numeric, non-null value in a numeric channel
    #[error("Line {line}: column {column} value {value:?} is not numeric")]
    TypeConversion {
        line: usize,
        column: String,
        value: String,
    },
}
