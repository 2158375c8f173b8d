//! Statements.
//!
//! Dispatch is on the first token, in a fixed order: `{` (block), `return`,
//! `var`/`val`, `if`, `for`, `while`, `version`, `break`, and finally an
//! expression statement.

use crate::parsers::zenscript::node::{Identifier, Mutability, Statement};
use crate::parsers::zenscript::stream::{PResult, TokenStream, begins_declaration_or_statement};
use crate::parsers::zenscript::token::TokenKind;

use super::expr::{parse_expression, parse_expression_or_error};
use super::types::parse_type_declaration;

/// Parse a statement, turning a failure into a recorded error and an
/// `Error` node after resynchronising.
pub(crate) fn parse_statement_or_error(s: &mut TokenStream<'_>) -> Statement {
    let start_pos = s.pos();
    let start = s.offset();
    match parse_statement(s) {
        Ok(statement) => statement,
        Err(error) => {
            let message = error.message.clone();
            s.error(error);
            s.synchronize(start_pos, begins_declaration_or_statement);
            Statement::Error {
                message,
                span: s.span_from(start),
            }
        }
    }
}

/// `{ statements }`, as used by function, constructor and lambda bodies.
pub(crate) fn parse_body(s: &mut TokenStream<'_>) -> PResult<Vec<Statement>> {
    s.expect(TokenKind::LBrace, "{ expected")?;
    let mut statements = Vec::new();
    while !s.at_end() && !s.at(TokenKind::RBrace) {
        statements.push(parse_statement_or_error(s));
    }
    s.expect(TokenKind::RBrace, "} expected")?;
    Ok(statements)
}

pub(crate) fn parse_statement(s: &mut TokenStream<'_>) -> PResult<Statement> {
    s.nested(parse_unguarded_statement)
}

fn parse_unguarded_statement(s: &mut TokenStream<'_>) -> PResult<Statement> {
    let start = s.offset();

    match s.kind() {
        Some(TokenKind::LBrace) => {
            let statements = parse_body(s)?;
            Ok(Statement::Block {
                statements,
                span: s.span_from(start),
            })
        }
        Some(TokenKind::Return) => {
            s.advance();
            let value = if s.at(TokenKind::Semicolon) {
                None
            } else {
                Some(parse_expression_or_error(s))
            };
            s.expect(TokenKind::Semicolon, "; expected")?;
            Ok(Statement::Return {
                value,
                span: s.span_from(start),
            })
        }
        Some(TokenKind::Var) | Some(TokenKind::Val) => parse_declare(s),
        Some(TokenKind::If) => {
            s.advance();
            s.expect(TokenKind::LParen, "Missing '('")?;
            let condition = parse_expression(s)?;
            s.expect(TokenKind::RParen, "Missing ')'")?;
            let then_branch = parse_statement(s)?;
            let else_branch = if s.eat(TokenKind::Else).is_some() {
                Some(Box::new(parse_statement(s)?))
            } else {
                None
            };
            Ok(Statement::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch,
                span: s.span_from(start),
            })
        }
        Some(TokenKind::For) => {
            s.advance();
            let mut variables = vec![expect_identifier(s)?];
            while s.eat(TokenKind::Comma).is_some() {
                variables.push(expect_identifier(s)?);
            }
            s.expect(TokenKind::In, "in expected")?;
            let iterable = parse_expression(s)?;
            let body = parse_statement(s)?;
            Ok(Statement::For {
                variables,
                iterable,
                body: Box::new(body),
                span: s.span_from(start),
            })
        }
        Some(TokenKind::While) => {
            s.advance();
            let condition = parse_expression(s)?;
            let body = parse_statement(s)?;
            Ok(Statement::While {
                condition,
                body: Box::new(body),
                span: s.span_from(start),
            })
        }
        Some(TokenKind::Version) => {
            s.advance();
            let number = match s.eat(TokenKind::IntValue) {
                Some(token) => token.text.clone(),
                None => return Err(s.unexpected("INT_VALUE expected")),
            };
            s.expect(TokenKind::Semicolon, "; expected")?;
            Ok(Statement::Version {
                number,
                span: s.span_from(start),
            })
        }
        Some(TokenKind::Break) => {
            s.advance();
            s.expect(TokenKind::Semicolon, "; expected")?;
            Ok(Statement::Break {
                span: s.span_from(start),
            })
        }
        _ => {
            let expr = parse_expression(s)?;
            s.expect(TokenKind::Semicolon, "; expected")?;
            Ok(Statement::Expression {
                expr,
                span: s.span_from(start),
            })
        }
    }
}

fn parse_declare(s: &mut TokenStream<'_>) -> PResult<Statement> {
    let start = s.offset();
    let mutability = match s.advance().map(|t| t.kind) {
        Some(TokenKind::Val) => Mutability::Val,
        _ => Mutability::Var,
    };
    let name = expect_identifier(s)?;
    let ty = parse_type_declaration(s)?;
    let value = if s.eat(TokenKind::Assign).is_some() {
        Some(parse_expression_or_error(s))
    } else {
        None
    };
    s.expect(TokenKind::Semicolon, "; expected")?;
    Ok(Statement::Declare {
        mutability,
        name,
        ty,
        value,
        span: s.span_from(start),
    })
}

pub(crate) fn expect_identifier(s: &mut TokenStream<'_>) -> PResult<Identifier> {
    match s.eat(TokenKind::Identifier) {
        Some(token) => Ok(Identifier::from_token(token)),
        None => Err(s.unexpected("Identifier expected.")),
    }
}

#[cfg(test)]
mod tests {
    use crate::parsers::zenscript::node::{Mutability, Statement};
    use crate::parsers::zenscript::{parse_statement, tokenize};

    fn parse_ok(source: &str) -> Statement {
        let parsed = parse_statement(&tokenize(source).tokens);
        assert!(parsed.errors.is_empty(), "{source}: {:?}", parsed.errors);
        parsed.node
    }

    #[test]
    fn test_declare_with_type_and_value() {
        match parse_ok("val count as int = 1 + 2;") {
            Statement::Declare {
                mutability,
                name,
                ty,
                value,
                ..
            } => {
                assert_eq!(mutability, Mutability::Val);
                assert_eq!(name.name, "count");
                assert_eq!(ty.map(|t| t.to_string()).as_deref(), Some("int"));
                assert_eq!(value.map(|v| v.to_string()).as_deref(), Some("(+ 1 2)"));
            }
            other => panic!("expected declaration, got {other:?}"),
        }
    }

    #[test]
    fn test_if_else_chain() {
        let statement = parse_ok("if (a == 1) { print(a); } else if (b) return; else break;");
        let Statement::If { else_branch, .. } = statement else {
            panic!("expected if");
        };
        assert!(matches!(
            else_branch.as_deref(),
            Some(Statement::If {
                else_branch: Some(_),
                ..
            })
        ));
    }

    #[test]
    fn test_for_in_with_multiple_variables() {
        let statement = parse_ok("for i, item in items { print(item); }");
        let Statement::For {
            variables,
            iterable,
            body,
            ..
        } = statement
        else {
            panic!("expected for");
        };
        let names: Vec<_> = variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["i", "item"]);
        assert_eq!(iterable.to_string(), "items");
        assert!(matches!(*body, Statement::Block { .. }));
    }

    #[test]
    fn test_for_over_range() {
        let statement = parse_ok("for i in 0 to 10 { }");
        let Statement::For { iterable, .. } = statement else {
            panic!("expected for");
        };
        assert_eq!(iterable.to_string(), "(to 0 10)");
    }

    #[test]
    fn test_while_version_and_break() {
        assert!(matches!(parse_ok("while i < 10 i += 1;"), Statement::While { .. }));
        assert!(matches!(
            parse_ok("version 3;"),
            Statement::Version { ref number, .. } if number == "3"
        ));
        assert!(matches!(parse_ok("break;"), Statement::Break { .. }));
    }

    #[test]
    fn test_missing_initializer_is_marked() {
        let parsed = parse_statement(&tokenize("var a = ;").tokens);
        assert_eq!(parsed.errors.len(), 1);
        let Statement::Declare { value, .. } = parsed.node else {
            panic!("expected declaration");
        };
        assert_eq!(value.map(|v| v.to_string()).as_deref(), Some("(error)"));
    }

    #[test]
    fn test_version_requires_integer() {
        let parsed = parse_statement(&tokenize("version x;").tokens);
        assert!(parsed.node.is_error());
        assert_eq!(parsed.errors[0].message, "INT_VALUE expected");
    }
}
