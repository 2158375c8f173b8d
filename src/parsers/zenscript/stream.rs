//! Token cursor for the recursive-descent grammar.
//!
//! Wraps the code tokens of one document with at most two tokens of
//! lookahead, collects recovered errors, and implements the consumption
//! protocol every grammar rule goes through (`expect`):
//!
//! 1. the expected token is next: consume it;
//! 2. the token after next is the expected one and the next token cannot
//!    start a statement: report and drop one token, then consume;
//! 3. the expected token is a closer: report it missing and carry on;
//! 4. otherwise fail, leaving the caller to resynchronise.
//!
//! Recursive rules enter through [`TokenStream::nested`], which bounds the
//! recursion depth so that pathological nesting fails the construct instead
//! of the thread.

use tracing::trace;

use super::error::{SyntaxError, SyntaxErrorKind};
use super::node::Span;
use super::token::{Token, TokenKind};

pub(crate) type PResult<T> = Result<T, SyntaxError>;

/// Deepest chain of nested statements, expressions and types the grammar
/// will follow.
pub(crate) const MAX_NESTING_DEPTH: usize = 32;

/// Keywords that begin a declaration or statement. Resynchronisation stops
/// in front of these.
pub(crate) fn begins_declaration_or_statement(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        Import
            | Global
            | Static
            | Function
            | ZenClass
            | Var
            | Val
            | If
            | For
            | While
            | Return
            | Break
            | Version
    )
}

/// First tokens of an expression.
pub(crate) fn begins_expression(kind: TokenKind) -> bool {
    use TokenKind::*;
    matches!(
        kind,
        IntValue
            | FloatValue
            | StringValue
            | Identifier
            | Function
            | Lt
            | LBracket
            | LBrace
            | LParen
            | True
            | False
            | Null
            | Not
            | Minus
    )
}

fn can_start_statement(kind: TokenKind) -> bool {
    begins_declaration_or_statement(kind) || begins_expression(kind)
}

/// Tokens that may be assumed present when missing.
fn is_closer(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Semicolon
            | TokenKind::Gt
            | TokenKind::Colon
    )
}

pub(crate) struct TokenStream<'t> {
    tokens: Vec<&'t Token>,
    pos: usize,
    errors: Vec<SyntaxError>,
    eof_offset: usize,
    depth: usize,
}

impl<'t> TokenStream<'t> {
    /// Lexer `ERROR` tokens are reported here and never reach the grammar.
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        let mut errors = Vec::new();
        let mut code = Vec::with_capacity(tokens.len());
        for token in tokens {
            if token.is(TokenKind::Error) {
                errors.push(SyntaxError::unexpected_character(token));
            } else {
                code.push(token);
            }
        }
        let eof_offset = tokens.last().map_or(0, |t| t.end_offset + 1);

        Self {
            tokens: code,
            pos: 0,
            errors,
            eof_offset,
            depth: 0,
        }
    }

    /// Run `rule` one nesting level deeper, failing once
    /// [`MAX_NESTING_DEPTH`] is reached.
    pub(crate) fn nested<T>(&mut self, rule: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingLimit,
                "Nested too deeply",
                self.current_span(),
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    pub(crate) fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos).copied()
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n).copied()
    }

    pub(crate) fn kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    pub(crate) fn nth_kind(&self, n: usize) -> Option<TokenKind> {
        self.peek_nth(n).map(|t| t.kind)
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.kind() == Some(kind)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn advance(&mut self) -> Option<&'t Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consume the next token if it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> Option<&'t Token> {
        if self.at(kind) { self.advance() } else { None }
    }

    /// Start offset of the next token, or the end of input.
    pub(crate) fn offset(&self) -> usize {
        self.peek().map_or(self.eof_offset, |t| t.start_offset)
    }

    /// End (exclusive) of the last consumed token.
    pub(crate) fn prev_end(&self) -> usize {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => token.end_offset + 1,
            None => self.offset(),
        }
    }

    /// Span from `start` to the end of the last consumed token.
    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::new(start, self.prev_end().max(start))
    }

    /// Span of the next token, or an empty span at end of input.
    pub(crate) fn current_span(&self) -> Span {
        self.peek().map_or(Span::empty(self.eof_offset), Span::of)
    }

    pub(crate) fn error(&mut self, error: SyntaxError) {
        trace!("Recovered syntax error: {} at {:?}", error.message, error.span);
        self.errors.push(error);
    }

    pub(crate) fn into_errors(self) -> Vec<SyntaxError> {
        let mut errors = self.errors;
        errors.sort_by_key(|e| e.span.start);
        errors
    }

    /// Build (but do not record) a failed expectation at the next token.
    pub(crate) fn unexpected(&self, message: &str) -> SyntaxError {
        SyntaxError::unexpected(message, self.peek(), self.current_span())
    }

    /// Consume `kind`, recovering by single-token deletion or, for closers,
    /// insertion. Returns the span of the consumed token (empty when the
    /// token was assumed).
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> PResult<Span> {
        if let Some(token) = self.eat(kind) {
            return Ok(Span::of(token));
        }

        if self.nth_kind(1) == Some(kind) {
            if let Some(stray) = self.peek().filter(|t| !can_start_statement(t.kind)) {
                self.error(SyntaxError::unexpected(
                    format!("Unexpected '{}': {}", stray.text, message),
                    Some(stray),
                    Span::of(stray),
                ));
                self.advance();
                if let Some(token) = self.advance() {
                    return Ok(Span::of(token));
                }
            }
        }

        if is_closer(kind) {
            let span = Span::empty(self.prev_end());
            self.error(SyntaxError::missing(message, span));
            return Ok(span);
        }

        Err(self.unexpected(message))
    }

    /// Skip past a failed construct that began at token index `start_pos`.
    ///
    /// Stops after a `;`, or in front of a `}` or a token in `boundary`.
    /// Always consumes at least one token.
    pub(crate) fn synchronize(&mut self, start_pos: usize, boundary: fn(TokenKind) -> bool) {
        if self.pos == start_pos {
            self.advance();
        }
        while let Some(kind) = self.kind() {
            match kind {
                TokenKind::Semicolon => {
                    self.advance();
                    break;
                }
                TokenKind::RBrace => break,
                kind if boundary(kind) => break,
                _ => {
                    self.advance();
                }
            }
        }
    }
}
