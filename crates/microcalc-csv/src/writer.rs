//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvWriteOptions;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write rows of cell text to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        rows: &[Vec<String>],
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(rows, file, options)
    }

    /// Write rows of cell text to a writer
    pub fn write<W: Write>(
        rows: &[Vec<String>],
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(options.line_terminator.to_csv())
            .flexible(true)
            .from_writer(writer);

        for row in rows {
            csv_writer.write_record(row)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
