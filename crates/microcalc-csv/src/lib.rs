//! # microcalc-csv
//!
//! CSV reader and writer for microcalc grids.
//!
//! Grids are plain rows of cell text. Rows may have different lengths in
//! both directions.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
