//! Formula Abstract Syntax Tree types
//!
//! Parsed formulas and evaluated cell values share one type, [`Node`]. A
//! literal node is already a settled value; every other variant is reduced
//! to one by the evaluator.
//!
//! Coercion goes through three capabilities. A node either exposes a
//! capability or it does not:
//!
//! | Variant   | stringify      | numify  | boolify     |
//! |-----------|----------------|---------|-------------|
//! | String    | text           | -       | -           |
//! | Number    | decimal text   | value   | value != 0  |
//! | Boolean   | `TRUE`/`FALSE` | 1 / 0   | flag        |
//! | Empty     | `""`           | 0       | false       |
//! | others    | -              | -       | -           |

use microcalc_core::CellAddress;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Numeric payload: integral or floating
///
/// Integer arithmetic stays integral and falls back to floating point on
/// overflow.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Parse a base-10 integer or float literal
    ///
    /// Surrounding whitespace is ignored. Words such as `inf` or `nan` and
    /// non-finite results are rejected.
    pub fn parse(text: &str) -> Option<Number> {
        let text = text.trim();
        if let Ok(n) = text.parse::<i64>() {
            return Some(Number::Integer(n));
        }
        if !text.bytes().any(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Number::Float)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Integer(n) => n == 0,
            Number::Float(n) => n == 0.0,
        }
    }

    /// True division; `None` when the divisor is zero
    pub fn checked_div(self, rhs: Number) -> Option<Number> {
        if rhs.is_zero() {
            return None;
        }
        Some(Number::Float(self.as_f64() / rhs.as_f64()))
    }

    fn integer_op(
        self,
        rhs: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Number {
        match (self, rhs) {
            (Number::Integer(a), Number::Integer(b)) => int_op(a, b)
                .map(Number::Integer)
                .unwrap_or_else(|| Number::Float(float_op(a as f64, b as f64))),
            _ => Number::Float(float_op(self.as_f64(), rhs.as_f64())),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        self.integer_op(rhs, i64::checked_add, |a, b| a + b)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        self.integer_op(rhs, i64::checked_sub, |a, b| a - b)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        self.integer_op(rhs, i64::checked_mul, |a, b| a * b)
    }
}

impl Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Integer(n) => n
                .checked_neg()
                .map(Number::Integer)
                .unwrap_or(Number::Float(-(n as f64))),
            Number::Float(n) => Number::Float(-n),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Number) -> bool {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::Integer(n)
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Integer(n as i64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{}", n),
            // Plain notation, never an exponent; floats keep a decimal point
            Number::Float(n) => {
                let text = n.to_string();
                if text.contains('.') {
                    write!(f, "{}", text)
                } else {
                    write!(f, "{}.0", text)
                }
            }
        }
    }
}

/// Binding strength of operators, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equality,
    Comparison,
    Sum,
    Product,
    Prefix,
}

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Negate,
}

impl PrefixOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            PrefixOperator::Negate => "-",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    // Comparison
    Equal,
    LessThan,
    GreaterThan,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl InfixOperator {
    pub fn precedence(self) -> Precedence {
        match self {
            InfixOperator::Equal => Precedence::Equality,
            InfixOperator::LessThan | InfixOperator::GreaterThan => Precedence::Comparison,
            InfixOperator::Add | InfixOperator::Subtract => Precedence::Sum,
            InfixOperator::Multiply | InfixOperator::Divide => Precedence::Product,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            InfixOperator::Equal => "=",
            InfixOperator::LessThan => "<",
            InfixOperator::GreaterThan => ">",
            InfixOperator::Add => "+",
            InfixOperator::Subtract => "-",
            InfixOperator::Multiply => "*",
            InfixOperator::Divide => "/",
        }
    }
}

/// Formula expression AST and settled cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    // === Literals ===
    /// String literal
    String(String),
    /// Numeric literal
    Number(Number),
    /// Boolean literal
    Boolean(bool),

    // === References ===
    /// Single cell reference, resolved by the evaluator
    Reference(CellAddress),

    // === Function call ===
    Function { name: String, args: Vec<Node> },

    // === Operators ===
    Prefix {
        op: PrefixOperator,
        operand: Box<Node>,
    },
    Infix {
        op: InfixOperator,
        left: Box<Node>,
        right: Box<Node>,
    },

    // === Terminal values ===
    /// Blank value; what out-of-range references resolve to
    #[default]
    Empty,
    /// Absorbing error value
    Error,
}

impl Node {
    pub fn string(s: impl Into<String>) -> Self {
        Node::String(s.into())
    }

    pub fn number(n: impl Into<Number>) -> Self {
        Node::Number(n.into())
    }

    pub fn reference(row: u32, col: u32) -> Self {
        Node::Reference(CellAddress::new(row, col))
    }

    pub fn function(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Function {
            name: name.into(),
            args,
        }
    }

    pub fn prefix(op: PrefixOperator, operand: Node) -> Self {
        Node::Prefix {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn infix(op: InfixOperator, left: Node, right: Node) -> Self {
        Node::Infix {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Whether no further reduction is possible
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Node::String(_) | Node::Number(_) | Node::Boolean(_) | Node::Empty | Node::Error
        )
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Node::Error)
    }

    /// Text form, if this node can be used as a string
    pub fn stringify(&self) -> Option<String> {
        match self {
            Node::String(s) => Some(s.clone()),
            Node::Number(n) => Some(n.to_string()),
            Node::Boolean(true) => Some("TRUE".to_string()),
            Node::Boolean(false) => Some("FALSE".to_string()),
            Node::Empty => Some(String::new()),
            _ => None,
        }
    }

    /// Numeric form, if this node can be used in arithmetic
    pub fn numify(&self) -> Option<Number> {
        match self {
            Node::Number(n) => Some(*n),
            Node::Boolean(b) => Some(Number::Integer(*b as i64)),
            Node::Empty => Some(Number::Integer(0)),
            _ => None,
        }
    }

    /// Truth value, if this node can be used as a condition
    pub fn boolify(&self) -> Option<bool> {
        match self {
            Node::Boolean(b) => Some(*b),
            Node::Number(n) => Some(!n.is_zero()),
            Node::Empty => Some(false),
            _ => None,
        }
    }

    /// Printed form of a cell in the output grid
    ///
    /// Settled values print as their plain text (`ERROR` for errors); other
    /// nodes fall back to their canonical formula text.
    pub fn render(&self) -> String {
        match self {
            Node::Error => "ERROR".to_string(),
            node if node.is_settled() => node.stringify().unwrap_or_default(),
            node => node.to_string(),
        }
    }
}

impl From<Number> for Node {
    fn from(n: Number) -> Self {
        Node::Number(n)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Node::Boolean(b)
    }
}

/// Canonical, fully parenthesized formula text
///
/// Parsing the printed text yields the same tree again.
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::String(s) => write!(f, "\"{}\"", s),
            Node::Number(n) => write!(f, "{}", n),
            Node::Boolean(true) => write!(f, "TRUE"),
            Node::Boolean(false) => write!(f, "FALSE"),
            Node::Reference(addr) => write!(f, "{}", addr),
            Node::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Node::Prefix { op, operand } => write!(f, "({}{})", op.symbol(), operand),
            Node::Infix { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Node::Empty => Ok(()),
            Node::Error => write!(f, "ERROR"),
        }
    }
}
