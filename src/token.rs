//! The token definition for the filter language.

use std::borrow::Cow;

use crate::ast::CompOp;

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Keywords
    And, // "and"
    Or,  // "or"

    // Literals
    Identifier(&'a str),
    String(Cow<'a, str>), // Unquoted content, escapes resolved
    Number(&'a str),      // Raw numeric text, coerced later
    Bool(bool),
    Date(&'a str), // YYYY-MM-DD

    // Punctuation
    LParen, // (
    RParen, // )
    Comma,  // ,

    // Operators: ==, !=, >, >=, <, <=, =in=, =out=, =like=, ...
    Op(CompOp),
}

impl TokenKind<'_> {
    /// Short human-readable description, used in parse errors.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::And => "'and'".to_string(),
            TokenKind::Or => "'or'".to_string(),
            TokenKind::Identifier(s) => format!("identifier '{}'", s),
            TokenKind::String(s) => format!("string \"{}\"", s),
            TokenKind::Number(n) => format!("number {}", n),
            TokenKind::Bool(b) => format!("boolean {}", b),
            TokenKind::Date(d) => format!("date {}", d),
            TokenKind::LParen => "'('".to_string(),
            TokenKind::RParen => "')'".to_string(),
            TokenKind::Comma => "','".to_string(),
            TokenKind::Op(op) => format!("operator '{}'", op),
        }
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
