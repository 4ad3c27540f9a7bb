//! Sheet of cells

use crate::ast::Node;
use crate::evaluator::{EvaluationOptions, EvaluationStats, Evaluator};
use crate::parser::parse_cell_with_options;
use microcalc_core::CellAddress;
use std::fmt;

static EMPTY_CELL: Node = Node::Empty;

/// A ragged grid of cells, addressed by zero-based row and column
///
/// The shape is fixed when the sheet is built; only [`Sheet::evaluate`]
/// changes the cells, replacing formulas with their values.
#[derive(Debug, Clone)]
pub struct Sheet {
    cells: Vec<Vec<Node>>,
    options: EvaluationOptions,
    formula_cells: usize,
    stats: EvaluationStats,
}

impl Sheet {
    /// Build a sheet from raw cell text
    pub fn new<R, C>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        Self::with_options(rows, EvaluationOptions::default())
    }

    /// Build a sheet from raw cell text with custom options
    pub fn with_options<R, C>(rows: R, options: EvaluationOptions) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        let mut formula_cells = 0;
        let cells: Vec<Vec<Node>> = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|raw| {
                        let raw = raw.as_ref();
                        if raw.starts_with('=') {
                            formula_cells += 1;
                        }
                        parse_cell_with_options(raw, &options.parser)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        Self {
            cells,
            options,
            formula_cells,
            stats: EvaluationStats::default(),
        }
    }

    /// Build a sheet from already parsed cells
    pub fn from_nodes(cells: Vec<Vec<Node>>, options: EvaluationOptions) -> Self {
        let formula_cells = cells
            .iter()
            .flatten()
            .filter(|node| !node.is_settled())
            .count();
        Self {
            cells,
            options,
            formula_cells,
            stats: EvaluationStats::default(),
        }
    }

    /// Evaluate every cell and return the rendered grid
    ///
    /// Statistics are reset on every call.
    pub fn evaluate(&mut self) -> Vec<Vec<String>> {
        let mut evaluator = Evaluator::new(&mut self.cells, &self.options);
        evaluator.evaluate_all();

        self.stats = EvaluationStats {
            formula_cells: self.formula_cells,
            ..evaluator.into_stats()
        };

        log::debug!(
            "Evaluated {} cells ({} formulas): {} errors, {} circular references, {} depth limit hits",
            self.stats.cells_evaluated,
            self.stats.formula_cells,
            self.stats.errors,
            self.stats.circular_references,
            self.stats.depth_exceeded
        );

        self.rendered()
    }

    /// Current cells rendered as text, without evaluating
    pub fn rendered(&self) -> Vec<Vec<String>> {
        self.cells
            .iter()
            .map(|row| row.iter().map(Node::render).collect())
            .collect()
    }

    /// Cell at zero-based `(row, col)`; [`Node::Empty`] when out of range
    pub fn cell(&self, row: usize, col: usize) -> &Node {
        self.cells
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Cell at an A1-style address
    pub fn cell_at(&self, address: &str) -> microcalc_core::Result<&Node> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell(addr.row as usize, addr.col as usize))
    }

    pub fn rows(&self) -> &[Vec<Node>] {
        &self.cells
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    /// Number of cells in `row`, zero when out of range
    pub fn row_len(&self, row: usize) -> usize {
        self.cells.get(row).map_or(0, Vec::len)
    }

    /// Statistics of the last evaluation
    pub fn stats(&self) -> &EvaluationStats {
        &self.stats
    }

    pub fn options(&self) -> &EvaluationOptions {
        &self.options
    }
}

/// Rendered cells, comma separated, one row per line
impl fmt::Display for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, cell) in row.iter().enumerate() {
                if j > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{}", cell.render())?;
            }
        }
        Ok(())
    }
}
