//! Error types for the microcalc facade

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading or saving sheets
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing CSV failed
    #[error(transparent)]
    Csv(#[from] microcalc_csv::CsvError),

    /// Invalid cell address
    #[error(transparent)]
    Address(#[from] microcalc_core::Error),
}

impl Error {
    /// The underlying I/O error, if the failure came from the file system
    pub fn io_error(&self) -> Option<&std::io::Error> {
        match self {
            Error::Csv(e) => e.io_error(),
            Error::Address(_) => None,
        }
    }
}
