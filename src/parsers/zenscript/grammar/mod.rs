//! Hand-written recursive-descent grammar for ZenScript.
//!
//! One function per production, grouped by level:
//!
//! - `decl`: program, imports, global/static, functions, classes
//! - `stmt`: statements and bodies
//! - `expr`: the expression precedence ladder and primaries
//! - `types`: type annotations
//!
//! Lookahead never exceeds two tokens. Where the grammar is ambiguous at one
//! token an explicit gate decides: `function IDENT` starts a declaration while
//! `function (` starts a lambda, `{` at statement level starts a block, and an
//! identifier spelled `to` after an operand starts a range.
//!
//! The entry points below never fail. Errors are recovered and returned next
//! to a complete tree.

mod decl;
mod expr;
mod stmt;
mod types;

use tracing::debug;

use super::error::SyntaxError;
use super::node::{Expression, ParseTree, Parsed, Statement, TypeAnnotation};
use super::stream::TokenStream;
use super::token::Token;

/// Parse a whole document.
///
/// # Arguments
/// * `tokens` - Code tokens from [`tokenize`](super::tokenize)
///
/// # Returns
/// A [`ParseTree`] whose `program` always exists, plus every recovered error
/// ordered by position.
pub fn parse(tokens: &[Token]) -> ParseTree {
    let mut stream = TokenStream::new(tokens);
    let program = decl::parse_program(&mut stream);
    let errors = stream.into_errors();
    debug!(
        "Parsed {} imports and {} items with {} errors",
        program.imports.len(),
        program.items.len(),
        errors.len()
    );
    ParseTree { program, errors }
}

fn reject_trailing(stream: &mut TokenStream<'_>, what: &str) {
    if let Some(token) = stream.peek() {
        let message = format!("Unexpected '{}' after {what}", token.text);
        stream.error(stream.unexpected(&message));
    }
}

/// Parse `tokens` as a single expression.
pub fn parse_expression(tokens: &[Token]) -> Parsed<Expression> {
    let mut stream = TokenStream::new(tokens);
    let node = expr::parse_expression_or_error(&mut stream);
    reject_trailing(&mut stream, "expression");
    Parsed {
        node,
        errors: stream.into_errors(),
    }
}

/// Parse `tokens` as a single statement.
pub fn parse_statement(tokens: &[Token]) -> Parsed<Statement> {
    let mut stream = TokenStream::new(tokens);
    let node = stmt::parse_statement_or_error(&mut stream);
    reject_trailing(&mut stream, "statement");
    Parsed {
        node,
        errors: stream.into_errors(),
    }
}

/// Parse `tokens` as a type annotation.
///
/// # Errors
/// Returns the first syntax error when `tokens` is not exactly one type.
pub fn parse_type(tokens: &[Token]) -> Result<TypeAnnotation, SyntaxError> {
    let mut stream = TokenStream::new(tokens);
    let ty = types::parse_type(&mut stream)?;
    reject_trailing(&mut stream, "type");
    match stream.into_errors().into_iter().next() {
        Some(error) => Err(error),
        None => Ok(ty),
    }
}
