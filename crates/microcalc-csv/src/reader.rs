//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvReadOptions;

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into rows of cell text
    pub fn read_file<P: AsRef<Path>>(
        path: P,
        options: &CsvReadOptions,
    ) -> CsvResult<Vec<Vec<String>>> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into rows of cell text
    ///
    /// Fields are kept verbatim, including surrounding whitespace.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Vec<Vec<String>>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for result in csv_reader.records() {
            let record = result?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(rows)
    }
}
