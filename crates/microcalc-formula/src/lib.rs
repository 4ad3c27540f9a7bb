//! # microcalc-formula
//!
//! Formula lexer, parser and grid evaluator for microcalc.
//!
//! This crate provides:
//! - Tokenizing formula text ([`Lexer`])
//! - Formula parsing with precedence climbing (text → [`Node`])
//! - Grid evaluation with memoization and cycle detection ([`Sheet`])
//! - Built-in functions (`CONCATENATE`, `IF`)
//!
//! Nothing in this crate returns an error for bad input. Malformed formulas,
//! type mismatches, division by zero and circular references all become the
//! [`Node::Error`] value, which renders as `ERROR`.
//!
//! ## Example
//!
//! ```rust
//! use microcalc_formula::Sheet;
//!
//! let mut sheet = Sheet::new(vec![
//!     vec!["1", "2"],
//!     vec!["3", "=A1 + A2 * B1"],
//! ]);
//! assert_eq!(sheet.evaluate(), vec![vec!["1", "2"], vec!["3", "7"]]);
//! ```

pub mod ast;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod sheet;

pub use ast::{InfixOperator, Node, Number, Precedence, PrefixOperator};
pub use evaluator::{EvaluationOptions, EvaluationStats, Evaluator};
pub use functions::{builtin_registry, FunctionDef, FunctionRegistry};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{parse_cell, parse_formula, Parser, ParserOptions};
pub use sheet::Sheet;
