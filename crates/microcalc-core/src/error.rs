//! Error types for microcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in microcalc-core
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Row number does not fit the address space
    #[error("Row number out of bounds in '{0}'")]
    RowOutOfBounds(String),

    /// Column letters do not fit the address space
    #[error("Column out of bounds in '{0}'")]
    ColumnOutOfBounds(String),
}
