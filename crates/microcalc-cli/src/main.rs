//! microcalc CLI - evaluate a CSV file like a spreadsheet

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use microcalc::prelude::*;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "microcalc")]
#[command(
    author,
    version,
    about = "Evaluate a CSV file like a spreadsheet",
    long_about = "Evaluate a CSV file like a spreadsheet.\n\n\
        Cells starting with '=' are formulas. Every cell of the output holds the \
        evaluated value, or ERROR when its formula cannot be evaluated."
)]
struct Cli {
    /// Input CSV file
    input: PathBuf,

    /// Output CSV file
    output: PathBuf,

    /// Field delimiter (default: comma)
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Leave the first input row out of the grid
    #[arg(long)]
    header: bool,

    /// Maximum nesting of references and operators during evaluation
    #[arg(long, default_value_t = EvaluationOptions::default().max_depth)]
    max_depth: usize,

    /// Print evaluation statistics to stderr
    #[arg(short, long)]
    stats: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

/// Which side of the conversion a file error happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(&cli)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG still wins when set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<()> {
    let delimiter = delimiter_byte(cli.delimiter)?;
    log::debug!(
        "Evaluating {} into {} (max depth {})",
        cli.input.display(),
        cli.output.display(),
        cli.max_depth
    );

    let read_options = CsvReadOptions {
        delimiter,
        has_header: cli.header,
        ..Default::default()
    };
    let evaluation = EvaluationOptions {
        max_depth: cli.max_depth,
        ..Default::default()
    };

    let mut sheet = Sheet::open_with_options(&cli.input, &read_options, evaluation)
        .map_err(|e| file_error(e, &cli.input, Access::Read))?;

    let write_options = CsvWriteOptions {
        delimiter,
        ..Default::default()
    };
    sheet
        .save_with_options(&cli.output, &write_options)
        .map_err(|e| file_error(e, &cli.output, Access::Write))?;

    if cli.stats {
        eprintln!("{}", stats_summary(sheet.stats()));
    }

    Ok(())
}

fn stats_summary(stats: &EvaluationStats) -> String {
    format!(
        "Evaluated {} cells ({} formulas, {} errors, {} circular references, {} depth limit hits)",
        stats.cells_evaluated,
        stats.formula_cells,
        stats.errors,
        stats.circular_references,
        stats.depth_exceeded
    )
}

/// Delimiters are single ASCII characters
fn delimiter_byte(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be an ASCII character, got '{}'", delimiter);
    }
    u8::try_from(delimiter).with_context(|| format!("Invalid delimiter '{}'", delimiter))
}

/// Turn a load/save failure into a message naming the path and the problem
fn file_error(err: microcalc::Error, path: &Path, access: Access) -> anyhow::Error {
    let problem = match err.io_error().map(|e| e.kind()) {
        Some(ErrorKind::NotFound) => match access {
            Access::Read => "file not found",
            Access::Write => "directory not found",
        },
        Some(ErrorKind::PermissionDenied) => "permission denied",
        _ if path.is_dir() => "path is a directory",
        Some(_) => match access {
            Access::Read => "problem reading file",
            Access::Write => "problem writing file",
        },
        None => match access {
            Access::Read => "malformed CSV input",
            Access::Write => "problem writing CSV output",
        },
    };
    anyhow::Error::new(err).context(format!("{}: {}", path.display(), problem))
}
