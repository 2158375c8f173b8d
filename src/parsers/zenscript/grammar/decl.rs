//! Program structure and declarations.
//!
//! ```text
//! Program      := Import* (GlobalStatic | Function | ZenClass | Statement)*
//! Import       := 'import' Package ('as' IDENT)? ';'
//! GlobalStatic := ('global' | 'static') IDENT TypeDeclare? '=' Expression ';'
//! Function     := 'function' IDENT Parameters TypeDeclare? Body
//! ZenClass     := 'zenClass' IDENT '{' (Field | Constructor | Function)* '}'
//! ```

use crate::parsers::zenscript::error::{SyntaxError, SyntaxErrorKind};
use crate::parsers::zenscript::node::{
    ClassMember, ConstructorDeclaration, FieldDeclaration, FieldModifier, FunctionDeclaration,
    GlobalScope, GlobalStaticDeclaration, Identifier, ImportStatement, Parameter, Program, Span,
    Statement, TopLevelItem, ZenClassDeclaration,
};
use crate::parsers::zenscript::stream::{PResult, TokenStream, begins_declaration_or_statement};
use crate::parsers::zenscript::token::TokenKind;

use super::expr::parse_expression_or_error;
use super::stmt::{expect_identifier, parse_body, parse_statement_or_error};
use super::types::parse_type_declaration;

pub(crate) fn parse_program(s: &mut TokenStream<'_>) -> Program {
    let start = s.offset();
    let mut program = Program::default();

    while !s.at_end() {
        let start_pos = s.pos();
        let item_start = s.offset();

        if s.at(TokenKind::Import) {
            match parse_import(s) {
                Ok(import) => {
                    if !program.items.is_empty() {
                        s.error(SyntaxError::new(
                            SyntaxErrorKind::Misplaced,
                            "Imports must precede other declarations",
                            import.span,
                        ));
                    }
                    program.imports.push(import);
                }
                Err(error) => {
                    s.error(error);
                    s.synchronize(start_pos, begins_declaration_or_statement);
                }
            }
            continue;
        }

        let item = match s.kind() {
            Some(TokenKind::Global) | Some(TokenKind::Static) => {
                parse_global_static(s).map(TopLevelItem::GlobalStatic)
            }
            Some(TokenKind::Function) if s.nth_kind(1) == Some(TokenKind::Identifier) => {
                parse_function(s).map(TopLevelItem::Function)
            }
            Some(TokenKind::ZenClass) => parse_zen_class(s).map(TopLevelItem::ZenClass),
            _ => Ok(TopLevelItem::Statement(parse_statement_or_error(s))),
        };

        let item = item.unwrap_or_else(|error| {
            let message = error.message.clone();
            s.error(error);
            s.synchronize(start_pos, begins_declaration_or_statement);
            TopLevelItem::Statement(Statement::Error {
                message,
                span: s.span_from(item_start),
            })
        });
        program.items.push(item);
    }

    program.span = s.span_from(start);
    program
}

/// Package path segments may be identifiers or keywords
/// (`import crafttweaker.item.IItemStack;`, `import mods.x.string;`).
fn expect_package_segment(s: &mut TokenStream<'_>) -> PResult<Identifier> {
    match s.peek() {
        Some(token) if token.kind == TokenKind::Identifier || token.kind.is_keyword() => {
            s.advance();
            Ok(Identifier::from_token(token))
        }
        _ => Err(s.unexpected("Identifier expected.")),
    }
}

fn parse_import(s: &mut TokenStream<'_>) -> PResult<ImportStatement> {
    let start = s.offset();
    s.advance();

    let mut path = vec![expect_package_segment(s)?];
    while s.eat(TokenKind::Dot).is_some() {
        path.push(expect_package_segment(s)?);
    }
    let alias = if s.eat(TokenKind::As).is_some() {
        Some(expect_identifier(s)?)
    } else {
        None
    };
    s.expect(TokenKind::Semicolon, "; expected")?;

    Ok(ImportStatement {
        path,
        alias,
        span: s.span_from(start),
    })
}

fn parse_global_static(s: &mut TokenStream<'_>) -> PResult<GlobalStaticDeclaration> {
    let start = s.offset();
    let scope = match s.advance().map(|t| t.kind) {
        Some(TokenKind::Static) => GlobalScope::Static,
        _ => GlobalScope::Global,
    };
    let name = expect_identifier(s)?;
    let ty = parse_type_declaration(s)?;
    s.expect(
        TokenKind::Assign,
        "Global and Static variables must be initialized.",
    )?;
    let value = parse_expression_or_error(s);
    s.expect(TokenKind::Semicolon, "; expected")?;

    Ok(GlobalStaticDeclaration {
        scope,
        name,
        ty,
        value,
        span: s.span_from(start),
    })
}

/// `( [IDENT TypeDeclare? (, IDENT TypeDeclare?)*] )`
pub(crate) fn parse_parameters(s: &mut TokenStream<'_>) -> PResult<Vec<Parameter>> {
    s.expect(TokenKind::LParen, "Missing '('")?;
    let mut params = Vec::new();
    if s.at(TokenKind::Identifier) {
        loop {
            let start = s.offset();
            let name = expect_identifier(s)?;
            let ty = parse_type_declaration(s)?;
            params.push(Parameter {
                name,
                ty,
                span: s.span_from(start),
            });
            if s.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
    }
    s.expect(TokenKind::RParen, "Missing ')'")?;
    Ok(params)
}

fn parse_function(s: &mut TokenStream<'_>) -> PResult<FunctionDeclaration> {
    let start = s.offset();
    s.advance();
    let name = expect_identifier(s)?;
    let params = parse_parameters(s)?;
    let return_type = parse_type_declaration(s)?;
    let body = parse_body(s)?;

    Ok(FunctionDeclaration {
        name,
        params,
        return_type,
        body,
        span: s.span_from(start),
    })
}

fn begins_class_member(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Var
            | TokenKind::Val
            | TokenKind::Static
            | TokenKind::ZenConstructor
            | TokenKind::Function
    )
}

fn parse_zen_class(s: &mut TokenStream<'_>) -> PResult<ZenClassDeclaration> {
    let start = s.offset();
    s.advance();
    let name = match s.eat(TokenKind::Identifier) {
        Some(token) => Identifier::from_token(token),
        None => return Err(s.unexpected("ClassName required")),
    };
    s.expect(TokenKind::LBrace, "{ expected")?;

    let mut members = Vec::new();
    while !s.at_end() && !s.at(TokenKind::RBrace) {
        let start_pos = s.pos();
        let member_start = s.offset();
        let member = parse_class_member(s).unwrap_or_else(|error| {
            let message = error.message.clone();
            s.error(error);
            s.synchronize(start_pos, begins_class_member);
            ClassMember::Error {
                message,
                span: s.span_from(member_start),
            }
        });
        members.push(member);
    }
    s.expect(TokenKind::RBrace, "} expected")?;

    Ok(ZenClassDeclaration {
        name,
        members,
        span: s.span_from(start),
    })
}

fn parse_class_member(s: &mut TokenStream<'_>) -> PResult<ClassMember> {
    let start = s.offset();
    match s.kind() {
        Some(TokenKind::Var) | Some(TokenKind::Val) | Some(TokenKind::Static) => {
            let modifier = match s.advance().map(|t| t.kind) {
                Some(TokenKind::Val) => FieldModifier::Val,
                Some(TokenKind::Static) => FieldModifier::Static,
                _ => FieldModifier::Var,
            };
            let name = expect_identifier(s)?;
            let ty = parse_type_declaration(s)?;
            let value = if s.eat(TokenKind::Assign).is_some() {
                Some(parse_expression_or_error(s))
            } else {
                None
            };
            s.expect(TokenKind::Semicolon, "; expected")?;
            Ok(ClassMember::Field(FieldDeclaration {
                modifier,
                name,
                ty,
                value,
                span: s.span_from(start),
            }))
        }
        Some(TokenKind::ZenConstructor) => {
            s.advance();
            let params = parse_parameters(s)?;
            // A declared constructor type carries no meaning; accept and drop it.
            parse_type_declaration(s)?;
            let body = parse_body(s)?;
            Ok(ClassMember::Constructor(ConstructorDeclaration {
                params,
                body,
                span: s.span_from(start),
            }))
        }
        Some(TokenKind::Function) => parse_function(s).map(ClassMember::Method),
        _ => Err(SyntaxError::unexpected(
            "Class member expected",
            s.peek(),
            s.peek().map_or(Span::empty(start), Span::of),
        )),
    }
}
