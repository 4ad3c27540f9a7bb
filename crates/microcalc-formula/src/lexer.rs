//! Formula lexer
//!
//! Turns formula text (without the leading `=`) into classified tokens, one
//! at a time. The lexer never fails: anything it cannot classify becomes a
//! [`TokenKind::Error`] token and the caller decides what to do with it.

use crate::ast::Number;
use microcalc_core::CellAddress;

/// Token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // End of input
    Eof,

    // Operators
    Plus,
    Minus,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Equals,

    // Delimiters
    LeftParen,
    RightParen,
    Semicolon,

    // Literals
    String,
    Number,
    Boolean,
    Reference,
    Function,

    // Unrecognized character or malformed literal
    Error,
}

/// A classified piece of formula text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the token (unquoted body for strings, empty for
    /// end of input and errors)
    pub literal: String,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>) -> Self {
        Self {
            kind,
            literal: literal.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    pub fn error() -> Self {
        Self::new(TokenKind::Error, "")
    }
}

/// Formula lexer
///
/// Once the input is exhausted, [`Lexer::next_token`] keeps returning
/// [`TokenKind::Eof`].
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Scan the next token
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let Some(c) = self.peek_char() else {
            return Token::eof();
        };

        // Single-character tokens
        let single = match c {
            '+' => Some(TokenKind::Plus),
            '-' => Some(TokenKind::Minus),
            '*' => Some(TokenKind::Asterisk),
            '/' => Some(TokenKind::Slash),
            '=' => Some(TokenKind::Equals),
            '<' => Some(TokenKind::Lt),
            '>' => Some(TokenKind::Gt),
            '(' => Some(TokenKind::LeftParen),
            ')' => Some(TokenKind::RightParen),
            ';' => Some(TokenKind::Semicolon),
            _ => None,
        };
        if let Some(kind) = single {
            self.advance();
            return Token::new(kind, c);
        }

        if c == '"' {
            return self.scan_string();
        }

        if c.is_alphanumeric() {
            return self.scan_word();
        }

        // Unknown character
        self.advance();
        Token::error()
    }

    fn scan_string(&mut self) -> Token {
        self.advance(); // Skip opening quote

        let rest = &self.input[self.pos..];
        match rest.find('"') {
            Some(end) => {
                let body = &rest[..end];
                self.pos += end + 1; // Body and closing quote
                Token::new(TokenKind::String, body)
            }
            None => {
                // Unterminated: swallow the rest of the input
                self.pos = self.input.len();
                Token::error()
            }
        }
    }

    /// Scan a run of letters, digits and dots, then classify it
    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .map_or(false, |c| c.is_alphanumeric() || c == '.')
        {
            self.advance();
        }
        let text = &self.input[start..self.pos];

        if self.peek_char() == Some('(') {
            return Token::new(TokenKind::Function, text);
        }
        if text == "TRUE" || text == "FALSE" {
            return Token::new(TokenKind::Boolean, text);
        }
        if Number::parse(text).is_some() {
            return Token::new(TokenKind::Number, text);
        }
        if is_reference(text) {
            return Token::new(TokenKind::Reference, text);
        }
        Token::error()
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }
}

/// Iterates over tokens up to, but not including, end of input
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        (token.kind != TokenKind::Eof).then_some(token)
    }
}

/// Letters followed by digits, e.g. `A1` or `bc23`
fn is_reference(text: &str) -> bool {
    let letters = text
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .count();
    let digits = &text[letters..];
    letters > 0 && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Decode a reference token into an address
///
/// Fails for text that looks like a reference but cannot address a cell
/// (row 0, overflowing coordinates).
pub(crate) fn decode_reference(text: &str) -> Option<CellAddress> {
    CellAddress::parse(text).ok()
}
