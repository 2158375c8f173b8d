//! Syntax error values recorded during parsing.
//!
//! Errors never abort a parse. They are collected on the [`ParseTree`]
//! alongside a best-effort tree and later published as diagnostics.
//!
//! [`ParseTree`]: super::node::ParseTree

use thiserror::Error;

use super::node::Span;
use super::token::{Token, TokenKind};

/// Category of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    /// A required token was absent and the parser continued as if it were present.
    MissingToken,
    /// A token appeared where the grammar did not allow it.
    UnexpectedToken,
    /// Input ended inside a construct.
    UnexpectedEof,
    /// A well-formed construct appeared in a position it is not allowed in.
    Misplaced,
    /// Statements, expressions or types nested past the parser's depth limit.
    NestingLimit,
}

/// A recovered syntax error with its location.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }

    /// A closer that was assumed present at `span`.
    pub fn missing(message: impl Into<String>, span: Span) -> Self {
        Self::new(SyntaxErrorKind::MissingToken, message, span)
    }

    /// A failed expectation at `found`, or at end of input when `found` is `None`.
    pub fn unexpected(message: impl Into<String>, found: Option<&Token>, span: Span) -> Self {
        let kind = if found.is_some() {
            SyntaxErrorKind::UnexpectedToken
        } else {
            SyntaxErrorKind::UnexpectedEof
        };
        Self::new(kind, message, span)
    }

    /// Text the lexer could not classify: a stray character, or a string
    /// or block comment that runs into the end of input.
    pub fn unexpected_character(token: &Token) -> Self {
        debug_assert_eq!(token.kind, TokenKind::Error);
        let message = if token.text.chars().nth(1).is_none() {
            format!("Unexpected character '{}'", token.text)
        } else if token.text.starts_with("/*") {
            "Unterminated comment".to_string()
        } else {
            "Unterminated literal".to_string()
        };
        Self::new(SyntaxErrorKind::UnexpectedToken, message, Span::of(token))
    }
}
