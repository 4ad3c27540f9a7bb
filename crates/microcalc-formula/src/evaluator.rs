//! Grid evaluator
//!
//! Reduces every cell of a grid to a settled value. Each cell is reduced at
//! most once per pass: the first resolution overwrites the stored formula
//! with its value, later references read that value back.
//!
//! A cell is unvisited, in progress, or settled. Reaching a cell that is
//! still in progress means the references form a cycle, and the reference
//! that closed the cycle yields [`Node::Error`].
//!
//! Every nested reduction, whether it follows a reference or descends into
//! an operator or function argument, is charged against a single depth
//! budget. Running out of budget yields [`Node::Error`] instead of growing
//! the call stack further.

use crate::ast::{InfixOperator, Node, Number, PrefixOperator};
use crate::functions::{builtin_registry, FunctionRegistry};
use crate::parser::ParserOptions;
use microcalc_core::CellAddress;
use std::collections::HashSet;

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Maximum number of nested reductions, references and operators alike
    pub max_depth: usize,
    /// Options used when cells are parsed
    pub parser: ParserOptions,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            parser: ParserOptions::default(),
        }
    }
}

/// Evaluation statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationStats {
    /// Number of cells visited
    pub cells_evaluated: usize,
    /// Number of cells holding a formula when loaded
    pub formula_cells: usize,
    /// Number of cells that settled to an error
    pub errors: usize,
    /// Number of circular references detected
    pub circular_references: usize,
    /// Number of times the depth limit was hit
    pub depth_exceeded: usize,
}

/// Evaluator over a borrowed grid of cells
pub struct Evaluator<'a> {
    cells: &'a mut [Vec<Node>],
    in_progress: HashSet<CellAddress>,
    depth: usize,
    options: &'a EvaluationOptions,
    registry: &'a FunctionRegistry,
    stats: EvaluationStats,
}

impl<'a> Evaluator<'a> {
    pub fn new(cells: &'a mut [Vec<Node>], options: &'a EvaluationOptions) -> Self {
        Self {
            cells,
            in_progress: HashSet::new(),
            depth: 0,
            options,
            registry: builtin_registry(),
            stats: EvaluationStats::default(),
        }
    }

    /// Use a custom function registry instead of the built-in one
    pub fn with_registry(mut self, registry: &'a FunctionRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn stats(&self) -> &EvaluationStats {
        &self.stats
    }

    pub fn into_stats(self) -> EvaluationStats {
        self.stats
    }

    /// Reduce every cell, row by row
    pub fn evaluate_all(&mut self) {
        for row in 0..self.cells.len() {
            for col in 0..self.cells[row].len() {
                self.resolve(CellAddress::new(row as u32, col as u32));
                self.stats.cells_evaluated += 1;
            }
        }

        self.stats.errors = self
            .cells
            .iter()
            .flatten()
            .filter(|node| node.is_error())
            .count();
    }

    /// Settle the cell at `addr` and return its value
    ///
    /// Out-of-range addresses are [`Node::Empty`].
    pub fn resolve(&mut self, addr: CellAddress) -> Node {
        let (row, col) = (addr.row as usize, addr.col as usize);
        let Some(cell) = self.cells.get(row).and_then(|r| r.get(col)) else {
            return Node::Empty;
        };

        // Checked before anything else: an in-progress slot is vacated
        if self.in_progress.contains(&addr) {
            self.stats.circular_references += 1;
            log::debug!("Circular reference through {}", addr);
            return Node::Error;
        }

        if cell.is_settled() {
            return cell.clone();
        }

        // Leave the cell untouched so a later, shallower pass can settle it
        if self.depth >= self.options.max_depth {
            self.stats.depth_exceeded += 1;
            log::warn!(
                "Depth limit of {} reached at {}",
                self.options.max_depth,
                addr
            );
            return Node::Error;
        }

        self.in_progress.insert(addr);
        let node = std::mem::take(&mut self.cells[row][col]);
        let value = self.reduce(node);
        self.cells[row][col] = value.clone();
        self.in_progress.remove(&addr);

        log::trace!("{} = {}", addr, value.render());
        value
    }

    /// Reduce a node to a settled value
    ///
    /// Settled values come back unchanged. Anything else costs one level of
    /// the depth budget while it is being reduced.
    pub fn reduce(&mut self, node: Node) -> Node {
        if node.is_settled() {
            return node;
        }

        if self.depth >= self.options.max_depth {
            self.stats.depth_exceeded += 1;
            log::warn!("Depth limit of {} reached", self.options.max_depth);
            return Node::Error;
        }

        self.depth += 1;
        let value = match node {
            Node::Reference(addr) => self.resolve(addr),

            Node::Prefix { op, operand } => {
                let operand = self.reduce(*operand);
                apply_prefix(op, &operand)
            }

            Node::Infix { op, left, right } => {
                let left = self.reduce(*left);
                let right = self.reduce(*right);
                apply_infix(op, &left, &right)
            }

            Node::Function { name, args } => {
                // Every argument is evaluated, even the branch IF discards
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.reduce(arg));
                }
                match self.registry.get(&name) {
                    Some(def) => def.call(&values),
                    None => {
                        log::debug!("Unknown function {}", name);
                        Node::Error
                    }
                }
            }

            settled => settled,
        };
        self.depth -= 1;
        value
    }
}

/// Apply a prefix operator to a settled operand
pub fn apply_prefix(op: PrefixOperator, operand: &Node) -> Node {
    match (op, operand.numify()) {
        (PrefixOperator::Negate, Some(n)) => Node::Number(-n),
        (_, None) => Node::Error,
    }
}

/// Apply a binary operator to settled operands
///
/// `=` compares structurally and never fails. Every other operator needs
/// both sides to have a numeric form.
pub fn apply_infix(op: InfixOperator, left: &Node, right: &Node) -> Node {
    if op == InfixOperator::Equal {
        return Node::Boolean(left == right);
    }

    let (Some(l), Some(r)) = (left.numify(), right.numify()) else {
        return Node::Error;
    };

    match op {
        InfixOperator::Add => finite(l + r),
        InfixOperator::Subtract => finite(l - r),
        InfixOperator::Multiply => finite(l * r),
        InfixOperator::Divide => l.checked_div(r).map_or(Node::Error, finite),
        InfixOperator::LessThan => Node::Boolean(l < r),
        InfixOperator::GreaterThan => Node::Boolean(l > r),
        InfixOperator::Equal => Node::Boolean(l == r),
    }
}

/// Overflow to infinity is an error, not a value
fn finite(n: Number) -> Node {
    if n.as_f64().is_finite() {
        Node::Number(n)
    } else {
        Node::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_cell, parse_formula};
    use pretty_assertions::assert_eq;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<Node>> {
        rows.iter()
            .map(|row| row.iter().map(|raw| parse_cell(raw)).collect())
            .collect()
    }

    fn eval(formula: &str) -> Node {
        let mut cells: Vec<Vec<Node>> = Vec::new();
        let options = EvaluationOptions::default();
        Evaluator::new(&mut cells, &options).reduce(parse_formula(formula))
    }

    fn addr(a1: &str) -> CellAddress {
        a1.parse().unwrap()
    }

    #[test]
    fn test_evaluate_literals() {
        assert_eq!(eval("42"), Node::number(42));
        assert_eq!(eval("\"Hello\""), Node::string("Hello"));
        assert_eq!(eval("TRUE"), Node::Boolean(true));
        assert_eq!(eval(""), Node::Empty);
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), Node::number(7));
        assert_eq!(eval("10 - 4 - 3"), Node::number(3));
        assert_eq!(eval("-2*-3.4"), Node::number(6.8));
        assert_eq!(eval("5 / 5"), Node::number(1.0));
        assert_eq!(eval("1 / 4"), Node::number(0.25));
        assert_eq!(eval("TRUE + 1"), Node::number(2));
    }

    #[test]
    fn test_integer_results_stay_integral() {
        assert!(matches!(eval("2 * 3 - 1"), Node::Number(Number::Integer(5))));
        assert!(matches!(eval("6 / 3"), Node::Number(Number::Float(_))));
        assert_eq!(eval("2 * 3 - 1").render(), "5");
        assert_eq!(eval("6 / 3").render(), "2.0");
    }

    #[test]
    fn test_evaluate_comparison() {
        assert_eq!(eval("1 < 2"), Node::Boolean(true));
        assert_eq!(eval("1 > 2"), Node::Boolean(false));
        assert_eq!(eval("5 < 3 * 3"), Node::Boolean(true));
        assert_eq!(eval("\"a\" < 1"), Node::Error);
    }

    #[test]
    fn test_evaluate_equality_is_structural() {
        assert_eq!(eval("1 = 1"), Node::Boolean(true));
        assert_eq!(eval("2 = 2.0"), Node::Boolean(true));
        assert_eq!(eval("\"a\" = \"a\""), Node::Boolean(true));
        assert_eq!(eval("1 = \"1\""), Node::Boolean(false));
        assert_eq!(eval("TRUE = 1"), Node::Boolean(false));
        assert_eq!(eval("(1 / 0) = 1"), Node::Boolean(false));
        assert_eq!(eval("(1 / 0) = (1 / 0)"), Node::Boolean(true));
    }

    #[test]
    fn test_evaluate_type_errors() {
        assert_eq!(eval("\"a\" + 1"), Node::Error);
        assert_eq!(eval("-\"a\""), Node::Error);
        assert_eq!(eval("1 / 0"), Node::Error);
        assert_eq!(eval("1 / 0.0"), Node::Error);
        assert_eq!(eval("(1 +"), Node::Error);
    }

    #[test]
    fn test_overflow_is_error() {
        assert_eq!(eval("1e308 * 10"), Node::Error);
        assert_eq!(eval("1e308 / 0.1"), Node::Error);
        // Integer overflow falls back to floating point
        assert_eq!(
            eval("9223372036854775807 + 1").render(),
            "9223372036854775808.0"
        );
    }

    #[test]
    fn test_error_absorbs() {
        assert_eq!(eval("-(1 / 0)"), Node::Error);
        assert_eq!(eval("(1 / 0) + 1"), Node::Error);
        assert_eq!(eval("CONCATENATE(\"a\"; 1 / 0)"), Node::Error);
        assert_eq!(eval("IF(1 / 0; 1; 2)"), Node::Error);
    }

    #[test]
    fn test_evaluate_functions() {
        assert_eq!(
            eval("CONCATENATE(\"Bar\"; 4; TRUE; \"Foo\")"),
            Node::string("Bar4TRUEFoo")
        );
        assert_eq!(eval("CONCATENATE()"), Node::string(""));
        assert_eq!(eval("IF(5 < 3 * 3; CONCATENATE(\"Foo\"); 5/5)"), Node::string("Foo"));
        assert_eq!(eval("IF(0; 1; 2)"), Node::number(2));
    }

    #[test]
    fn test_function_dispatch_errors() {
        assert_eq!(eval("SUM(1; 2)"), Node::Error);
        assert_eq!(eval("if(TRUE; 1; 2)"), Node::Error);
        assert_eq!(eval("IF()"), Node::Error);
        assert_eq!(eval("IF(TRUE; 1)"), Node::Error);
    }

    #[test]
    fn test_if_is_eager() {
        // The unused branch still gets reduced, so its cycle is detected
        let mut cells = grid(&[&["=IF(TRUE; 1; A1)"]]);
        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut cells, &options);
        assert_eq!(evaluator.resolve(addr("A1")), Node::number(1));
        assert_eq!(evaluator.stats().circular_references, 1);
    }

    #[test]
    fn test_resolve_memoizes() {
        let mut cells = grid(&[&["1", "=A1 + 1"]]);
        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut cells, &options);
        assert_eq!(evaluator.resolve(addr("B1")), Node::number(2));
        assert_eq!(evaluator.resolve(addr("B1")), Node::number(2));
        drop(evaluator);
        assert_eq!(cells[0][1], Node::number(2));
    }

    #[test]
    fn test_resolve_out_of_range() {
        let mut cells = grid(&[&["1"], &[]]);
        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut cells, &options);
        assert_eq!(evaluator.resolve(addr("Z99")), Node::Empty);
        assert_eq!(evaluator.resolve(addr("B1")), Node::Empty);
        assert_eq!(evaluator.resolve(addr("A2")), Node::Empty);
    }

    #[test]
    fn test_reduce_is_idempotent_on_settled_values() {
        let mut cells = Vec::new();
        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut cells, &options);
        for node in [
            Node::number(3),
            Node::number(2.5),
            Node::string("x"),
            Node::Boolean(false),
            Node::Empty,
            Node::Error,
        ] {
            assert_eq!(evaluator.reduce(node.clone()), node);
        }
    }

    #[test]
    fn test_cycles() {
        let mut cells = grid(&[&["=B1", "=A1", "=C1"], &["=A2 + 1", "=A1", "5"]]);
        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut cells, &options);
        evaluator.evaluate_all();
        let stats = evaluator.into_stats();

        assert_eq!(stats.circular_references, 3);
        assert_eq!(stats.errors, 5);
        assert_eq!(cells[0], vec![Node::Error, Node::Error, Node::Error]);
        assert_eq!(cells[1], vec![Node::Error, Node::Error, Node::number(5)]);
    }

    #[test]
    fn test_depth_limit() {
        // A1 -> A2 -> ... -> A19 -> A20 = 7
        let mut rows: Vec<Vec<Node>> = (2..=20)
            .map(|next| vec![parse_cell(&format!("=A{}", next))])
            .collect();
        rows.push(vec![Node::number(7)]);

        let options = EvaluationOptions {
            max_depth: 8,
            ..Default::default()
        };
        let mut evaluator = Evaluator::new(&mut rows, &options);
        evaluator.evaluate_all();
        let stats = evaluator.into_stats();

        assert_eq!(stats.depth_exceeded, 2);
        assert_eq!(stats.circular_references, 0);
        for (i, row) in rows.iter().enumerate() {
            let expected = if i < 16 { Node::Error } else { Node::number(7) };
            assert_eq!(row[0], expected, "row {}", i + 1);
        }
    }

    #[test]
    fn test_operators_share_the_depth_budget() {
        let options = EvaluationOptions {
            max_depth: 8,
            ..Default::default()
        };
        let mut cells = Vec::new();
        let mut evaluator = Evaluator::new(&mut cells, &options);

        let within = format!("{}1", "-".repeat(8));
        assert_eq!(evaluator.reduce(parse_formula(&within)), Node::number(1));
        assert_eq!(evaluator.stats().depth_exceeded, 0);

        let beyond = format!("{}1", "-".repeat(9));
        assert_eq!(evaluator.reduce(parse_formula(&beyond)), Node::Error);
        assert_eq!(evaluator.stats().depth_exceeded, 1);
    }

    #[test]
    fn test_operator_depth_inside_a_cell_chain() {
        // Each hop costs the reference plus two negations, and settled
        // cells cost nothing
        let mut rows: Vec<Vec<Node>> = (2..=6)
            .map(|next| vec![parse_cell(&format!("=--A{}", next))])
            .collect();
        rows.push(vec![Node::number(3)]);

        let options = EvaluationOptions {
            max_depth: 9,
            ..Default::default()
        };
        let mut evaluator = Evaluator::new(&mut rows, &options);
        assert_eq!(evaluator.resolve(addr("A4")), Node::number(3));
        assert_eq!(evaluator.resolve(addr("A1")), Node::number(3));
        assert_eq!(evaluator.stats().depth_exceeded, 0);
    }

    #[test]
    fn test_long_chain_within_default_limit() {
        let mut rows: Vec<Vec<Node>> = (2..=500)
            .map(|next| vec![parse_cell(&format!("=A{} + 1", next))])
            .collect();
        rows.push(vec![Node::number(0)]);

        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut rows, &options);
        assert_eq!(evaluator.resolve(addr("A1")), Node::number(499));
        assert_eq!(evaluator.stats().depth_exceeded, 0);
    }

    #[test]
    fn test_custom_registry() {
        fn fn_answer(_args: &[Node]) -> Node {
            Node::number(42)
        }

        let mut registry = FunctionRegistry::empty();
        registry.register(crate::functions::FunctionDef {
            name: "ANSWER",
            min_args: 0,
            max_args: Some(0),
            implementation: fn_answer,
        });

        let mut cells = Vec::new();
        let options = EvaluationOptions::default();
        let mut evaluator = Evaluator::new(&mut cells, &options).with_registry(&registry);
        assert_eq!(
            evaluator.reduce(parse_formula("ANSWER() + 1")),
            Node::number(43)
        );
        assert_eq!(evaluator.reduce(parse_formula("IF(TRUE; 1; 2)")), Node::Error);
    }
}
