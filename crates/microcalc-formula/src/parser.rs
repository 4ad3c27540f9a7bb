//! Formula parser
//!
//! A precedence climbing parser over the token stream of [`Lexer`], with a
//! one-token lookahead. Parsing never fails: syntax problems become
//! [`Node::Error`] at the point where they are found.

use crate::ast::{InfixOperator, Node, Number, Precedence, PrefixOperator};
use crate::lexer::{decode_reference, Lexer, Token, TokenKind};

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum expression nesting depth; deeper terms parse as errors
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Parse a formula body (the text after the leading `=`)
///
/// # Example
/// ```rust
/// use microcalc_formula::parse_formula;
///
/// let ast = parse_formula("A1 + A2 * B1");
/// assert_eq!(ast.to_string(), "(A1 + (A2 * B1))");
/// ```
pub fn parse_formula(body: &str) -> Node {
    Parser::new(body).parse()
}

/// Load a raw cell
///
/// Text starting with `=` is a formula. Anything else is a number literal
/// if it reads as one, otherwise a string literal.
pub fn parse_cell(raw: &str) -> Node {
    parse_cell_with_options(raw, &ParserOptions::default())
}

pub(crate) fn parse_cell_with_options(raw: &str, options: &ParserOptions) -> Node {
    if let Some(body) = raw.strip_prefix('=') {
        return Parser::with_options(body, options.clone()).parse();
    }
    match Number::parse(raw) {
        Some(n) => Node::Number(n),
        None => Node::String(raw.to_string()),
    }
}

/// Formula parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peek: Token,
    depth: usize,
    options: ParserOptions,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, ParserOptions::default())
    }

    pub fn with_options(input: &'a str, options: ParserOptions) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        let peek = lexer.next_token();
        Self {
            lexer,
            current,
            peek,
            depth: 0,
            options,
        }
    }

    /// Parse the whole input into a single root node
    pub fn parse(mut self) -> Node {
        if self.current.kind == TokenKind::Eof {
            return Node::Empty;
        }

        let expr = self.parse_expression(Precedence::Lowest);

        // Trailing input invalidates the whole formula
        if self.peek.kind != TokenKind::Eof {
            return Node::Error;
        }
        expr
    }

    // === Token handling ===

    fn next_token(&mut self) {
        let next = self.lexer.next_token();
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn peek_is(&self, kind: TokenKind) -> bool {
        self.peek.kind == kind
    }

    fn peek_infix(&self) -> Option<InfixOperator> {
        infix_operator(self.peek.kind)
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self, precedence: Precedence) -> Node {
        if self.depth >= self.options.max_depth {
            return Node::Error;
        }
        self.depth += 1;
        let expr = self.parse_infix(precedence);
        self.depth -= 1;
        expr
    }

    /// Fold binary operators that bind tighter than `precedence`
    ///
    /// Each fold nests the tree one level deeper on the left, so it counts
    /// toward the depth limit like a nested expression does.
    fn parse_infix(&mut self, precedence: Precedence) -> Node {
        let outer = self.depth;
        let mut left = self.parse_primary();

        while let Some(op) = self.peek_infix() {
            if op.precedence() <= precedence {
                break;
            }
            if self.depth >= self.options.max_depth {
                left = Node::Error;
                break;
            }
            self.depth += 1;
            self.next_token(); // Operator becomes current
            self.next_token(); // Start of the right operand
            let right = self.parse_expression(op.precedence());
            left = Node::infix(op, left, right);
        }

        self.depth = outer;
        left
    }

    fn parse_primary(&mut self) -> Node {
        match self.current.kind {
            TokenKind::Function => self.parse_function(),
            TokenKind::Number => Number::parse(&self.current.literal)
                .map(Node::Number)
                .unwrap_or(Node::Error),
            TokenKind::String => Node::String(self.current.literal.clone()),
            TokenKind::Boolean => Node::Boolean(self.current.literal == "TRUE"),
            TokenKind::Reference => match decode_reference(&self.current.literal) {
                Some(addr) => Node::Reference(addr),
                // Row 0 or overflow: no cell can be addressed
                None => Node::Empty,
            },
            TokenKind::LeftParen => self.parse_parenthesized(),
            TokenKind::Minus => {
                self.next_token();
                let operand = self.parse_expression(Precedence::Prefix);
                Node::prefix(PrefixOperator::Negate, operand)
            }
            _ => Node::Error,
        }
    }

    fn parse_parenthesized(&mut self) -> Node {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest);

        if !self.peek_is(TokenKind::RightParen) {
            return Node::Error;
        }
        self.next_token();
        expr
    }

    fn parse_function(&mut self) -> Node {
        let name = self.current.literal.clone();

        if !self.peek_is(TokenKind::LeftParen) {
            return Node::Error;
        }
        self.next_token();

        let mut args = Vec::new();

        // Parse arguments
        if !self.peek_is(TokenKind::RightParen) {
            self.next_token();
            args.push(self.parse_expression(Precedence::Lowest));

            while self.peek_is(TokenKind::Semicolon) {
                self.next_token();
                self.next_token();
                args.push(self.parse_expression(Precedence::Lowest));
            }
        }

        if !self.peek_is(TokenKind::RightParen) {
            return Node::Error;
        }
        self.next_token();

        Node::Function { name, args }
    }
}

fn infix_operator(kind: TokenKind) -> Option<InfixOperator> {
    match kind {
        TokenKind::Equals => Some(InfixOperator::Equal),
        TokenKind::Lt => Some(InfixOperator::LessThan),
        TokenKind::Gt => Some(InfixOperator::GreaterThan),
        TokenKind::Plus => Some(InfixOperator::Add),
        TokenKind::Minus => Some(InfixOperator::Subtract),
        TokenKind::Asterisk => Some(InfixOperator::Multiply),
        TokenKind::Slash => Some(InfixOperator::Divide),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn reference(a1: &str) -> Node {
        Node::Reference(a1.parse().unwrap())
    }

    fn infix(op: InfixOperator, left: Node, right: Node) -> Node {
        Node::infix(op, left, right)
    }

    fn negate(operand: Node) -> Node {
        Node::prefix(PrefixOperator::Negate, operand)
    }

    #[test]
    fn test_parse_literals() {
        assert_eq!(parse_formula("42"), Node::number(42));
        assert_eq!(parse_formula("3.25"), Node::number(3.25));
        assert_eq!(parse_formula("1e3"), Node::number(1000.0));
        assert_eq!(parse_formula("\"Hello\""), Node::string("Hello"));
        assert_eq!(parse_formula("TRUE"), Node::Boolean(true));
        assert_eq!(parse_formula("FALSE"), Node::Boolean(false));
        assert_eq!(parse_formula("C9"), Node::reference(8, 2));
    }

    #[test]
    fn test_integer_and_float_literals_stay_apart() {
        assert!(matches!(parse_formula("2"), Node::Number(Number::Integer(2))));
        assert!(matches!(parse_formula("2.0"), Node::Number(Number::Float(_))));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_formula(""), Node::Empty);
        assert_eq!(parse_formula("   "), Node::Empty);
    }

    #[test]
    fn test_precedence() {
        assert_eq!(
            parse_formula("A1 + A2 * B1"),
            infix(
                InfixOperator::Add,
                reference("A1"),
                infix(InfixOperator::Multiply, reference("A2"), reference("B1")),
            )
        );

        // Comparison binds tighter than equality, looser than arithmetic
        assert_eq!(
            parse_formula("A3=A2<1+2"),
            infix(
                InfixOperator::Equal,
                reference("A3"),
                infix(
                    InfixOperator::LessThan,
                    reference("A2"),
                    infix(InfixOperator::Add, Node::number(1), Node::number(2)),
                ),
            )
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            parse_formula("10 - 4 - 3"),
            infix(
                InfixOperator::Subtract,
                infix(InfixOperator::Subtract, Node::number(10), Node::number(4)),
                Node::number(3),
            )
        );
        assert_eq!(
            parse_formula("A1 * IF() * CONCATENATE(\"DDD\"; F11)").to_string(),
            "((A1 * IF()) * CONCATENATE(\"DDD\"; F11))"
        );
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(
            parse_formula("A11*(((2)))+3"),
            infix(
                InfixOperator::Add,
                infix(InfixOperator::Multiply, reference("A11"), Node::number(2)),
                Node::number(3),
            )
        );
        assert_eq!(parse_formula("(1 + 2) * 3").to_string(), "((1 + 2) * 3)");
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(
            parse_formula("-2*-3.4"),
            infix(
                InfixOperator::Multiply,
                negate(Node::number(2)),
                negate(Node::number(3.4)),
            )
        );
        // Unary minus binds tighter than any binary operator
        assert_eq!(
            parse_formula("-A1 + 1"),
            infix(InfixOperator::Add, negate(reference("A1")), Node::number(1))
        );
        assert_eq!(parse_formula("--1"), negate(negate(Node::number(1))));
    }

    #[test]
    fn test_function_calls() {
        assert_eq!(parse_formula("IF()"), Node::function("IF", vec![]));
        assert_eq!(
            parse_formula("CONCATENATE(\"Bar\"; 4; TRUE; \"Foo\")"),
            Node::function(
                "CONCATENATE",
                vec![
                    Node::string("Bar"),
                    Node::number(4),
                    Node::Boolean(true),
                    Node::string("Foo"),
                ],
            )
        );
        assert_eq!(
            parse_formula("IF(A2<B2 * B2; CONCATENATE(\"Foo\"); 5/5)").to_string(),
            "IF((A2 < (B2 * B2)); CONCATENATE(\"Foo\"); (5 / 5))"
        );
        // Names are kept as written
        assert_eq!(parse_formula("if(1;2;3)").to_string(), "if(1; 2; 3)");
    }

    #[test]
    fn test_syntax_errors() {
        assert_eq!(parse_formula("((((()))))"), Node::Error);
        assert_eq!(parse_formula("(1 + 2"), Node::Error);
        assert_eq!(parse_formula("1 2"), Node::Error);
        assert_eq!(
            parse_formula("1 +"),
            infix(InfixOperator::Add, Node::number(1), Node::Error)
        );
        assert_eq!(parse_formula(")"), Node::Error);
        assert_eq!(parse_formula("\"unterminated"), Node::Error);
        assert_eq!(parse_formula("IF(1;2"), Node::Error);
        assert_eq!(parse_formula("1 & 2"), Node::Error);
    }

    #[test]
    fn test_error_operand_keeps_structure() {
        assert_eq!(
            parse_formula("TRUE + IF("),
            infix(InfixOperator::Add, Node::Boolean(true), Node::Error)
        );
        assert_eq!(
            parse_formula("(*) * 3"),
            infix(InfixOperator::Multiply, Node::Error, Node::number(3))
        );
    }

    #[test]
    fn test_unaddressable_reference_is_empty() {
        assert_eq!(parse_formula("A0"), Node::Empty);
        assert_eq!(
            parse_formula("A0 + 1"),
            infix(InfixOperator::Add, Node::Empty, Node::number(1))
        );
        assert_eq!(parse_formula("A99999999999"), Node::Empty);
    }

    #[test]
    fn test_depth_limit() {
        let options = ParserOptions { max_depth: 4 };
        let shallow = "((1))";
        let deep = "((((((1))))))";

        assert_eq!(
            Parser::with_options(shallow, options.clone()).parse(),
            Node::number(1)
        );
        assert_eq!(Parser::with_options(deep, options).parse(), Node::Error);

        // The default limit comfortably handles ordinary nesting but stops
        // pathological input without exhausting the stack
        let nested = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(parse_formula(&nested), Node::number(1));
        let pathological = format!("{}1{}", "(".repeat(50_000), ")".repeat(50_000));
        assert_eq!(parse_formula(&pathological), Node::Error);
        let negations = format!("{}1", "-".repeat(50_000));
        assert_ne!(parse_formula(&negations), Node::Empty);
    }

    #[test]
    fn test_operator_chain_counts_toward_depth() {
        let sum = |terms: usize| vec!["1"; terms].join("+");

        let short = parse_formula(&sum(200));
        assert_eq!(short.to_string().matches('+').count(), 199);

        // A left-deep fold is as deep as its number of operators
        assert_eq!(parse_formula(&sum(200_000)), Node::Error);
        assert_eq!(
            parse_formula(&format!("({}) * 2", sum(300))),
            Node::Error
        );

        let options = ParserOptions { max_depth: 4 };
        assert_eq!(
            Parser::with_options("1 + 1 + 1", options.clone()).parse().to_string(),
            "((1 + 1) + 1)"
        );
        assert_eq!(
            Parser::with_options("1 + 1 + 1 + 1 + 1", options).parse(),
            Node::Error
        );
    }

    #[test]
    fn test_canonical_text_reparses() {
        for text in [
            "A1 + A2 * B1",
            "-2*-3.4",
            "IF(A2<B2 * B2; CONCATENATE(\"Foo\"); 5/5)",
            "A3=A2",
            "1 / 2 / 3",
            "CONCATENATE()",
            "(1 +",
            "7.0 - -bc23",
        ] {
            let parsed = parse_formula(text);
            assert_eq!(parse_formula(&parsed.to_string()), parsed, "{}", text);
        }
    }

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("42"), Node::number(42));
        assert_eq!(parse_cell(" 42 "), Node::number(42));
        assert_eq!(parse_cell("6.5"), Node::number(6.5));
        assert_eq!(parse_cell("Hello"), Node::string("Hello"));
        assert_eq!(parse_cell(""), Node::string(""));
        assert_eq!(parse_cell("TRUE"), Node::string("TRUE"));
        assert_eq!(parse_cell("="), Node::Empty);
        assert_eq!(
            parse_cell("=A1+1"),
            infix(InfixOperator::Add, reference("A1"), Node::number(1))
        );
    }
}
