//! # microcalc
//!
//! A small spreadsheet formula evaluator.
//!
//! A sheet is a grid of raw cell text. Cells starting with `=` are formulas
//! over numbers, strings, booleans, cell references, the operators
//! `= < > + - * /` and the functions `CONCATENATE` and `IF` (arguments are
//! separated by `;`). Evaluation replaces every cell with its value; any
//! problem inside a formula makes that cell `ERROR`.
//!
//! ## Example
//!
//! ```rust
//! use microcalc::prelude::*;
//!
//! let mut sheet = Sheet::new(vec![
//!     vec!["Hello", "World", "=CONCATENATE(A1;B1)"],
//!     vec!["5", "3", "=IF(A2<B2 * B2; CONCATENATE(\"Foo\"); 5/5)"],
//!     vec!["1", "=A3=A2", "=A3<A2"],
//! ]);
//!
//! assert_eq!(
//!     sheet.evaluate(),
//!     vec![
//!         vec!["Hello", "World", "HelloWorld"],
//!         vec!["5", "3", "Foo"],
//!         vec!["1", "FALSE", "TRUE"],
//!     ]
//! );
//!
//! // Load and save CSV files
//! // let mut sheet = Sheet::open("input.csv").unwrap();
//! // sheet.save("output.csv").unwrap();
//! ```

mod error;
pub mod prelude;

pub use error::{Error, Result};

// Re-export core types
pub use microcalc_core::CellAddress;

// Re-export formula types
pub use microcalc_formula::{
    parse_cell, parse_formula, EvaluationOptions, EvaluationStats, InfixOperator, Node, Number,
    ParserOptions, PrefixOperator, Sheet,
};

// Re-export I/O types
pub use microcalc_csv::{
    CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter, LineTerminator,
};

use std::path::Path;

/// Extension trait for Sheet to add file I/O
pub trait SheetExt: Sized {
    /// Open a sheet from a CSV file
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Open a sheet from a CSV file with custom options
    fn open_with_options<P: AsRef<Path>>(
        path: P,
        csv: &CsvReadOptions,
        evaluation: EvaluationOptions,
    ) -> Result<Self>;

    /// Evaluate the sheet and save the rendered grid to a CSV file
    fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()>;

    /// Evaluate the sheet and save the rendered grid with custom options
    fn save_with_options<P: AsRef<Path>>(
        &mut self,
        path: P,
        csv: &CsvWriteOptions,
    ) -> Result<()>;
}

impl SheetExt for Sheet {
    fn open<P: AsRef<Path>>(path: P) -> Result<Sheet> {
        Self::open_with_options(path, &CsvReadOptions::default(), EvaluationOptions::default())
    }

    fn open_with_options<P: AsRef<Path>>(
        path: P,
        csv: &CsvReadOptions,
        evaluation: EvaluationOptions,
    ) -> Result<Sheet> {
        let path = path.as_ref();
        let rows = CsvReader::read_file(path, csv)?;
        log::info!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Sheet::with_options(rows, evaluation))
    }

    fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.save_with_options(path, &CsvWriteOptions::default())
    }

    fn save_with_options<P: AsRef<Path>>(
        &mut self,
        path: P,
        csv: &CsvWriteOptions,
    ) -> Result<()> {
        let path = path.as_ref();
        let rendered = self.evaluate();
        CsvWriter::write_file(&rendered, path, csv)?;
        log::info!("Wrote {} rows to {}", rendered.len(), path.display());
        Ok(())
    }
}
