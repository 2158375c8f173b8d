//! Type annotations.
//!
//! ```text
//! Type        := Base ( '[' Type? ']' )*
//! Base        := primitive | IDENT ('.' IDENT)* | 'function' '(' Types? ')' ':'? Type | '[' Type ']'
//! TypeDeclare := ('as' | ':') Type
//! ```

use crate::parsers::zenscript::node::TypeAnnotation;
use crate::parsers::zenscript::stream::{PResult, TokenStream};
use crate::parsers::zenscript::token::TokenKind;

pub(crate) fn begins_type(kind: TokenKind) -> bool {
    kind.is_primitive_type()
        || matches!(
            kind,
            TokenKind::Identifier | TokenKind::Function | TokenKind::LBracket
        )
}

/// Optional type declaration after a name: `as Type` or `: Type`.
pub(crate) fn parse_type_declaration(s: &mut TokenStream<'_>) -> PResult<Option<TypeAnnotation>> {
    if s.eat(TokenKind::As).is_none() {
        if !(s.at(TokenKind::Colon) && s.nth_kind(1).is_some_and(begins_type)) {
            return Ok(None);
        }
        s.advance();
    }
    parse_type(s).map(Some)
}

pub(crate) fn parse_type(s: &mut TokenStream<'_>) -> PResult<TypeAnnotation> {
    s.nested(parse_suffixed_type)
}

fn parse_suffixed_type(s: &mut TokenStream<'_>) -> PResult<TypeAnnotation> {
    let start = s.offset();
    let mut ty = parse_base_type(s)?;

    while s.eat(TokenKind::LBracket).is_some() {
        let key = if s.at(TokenKind::RBracket) {
            None
        } else {
            Some(Box::new(parse_type(s)?))
        };
        s.expect(TokenKind::RBracket, "] expected")?;
        ty = TypeAnnotation::Associative {
            value: Box::new(ty),
            key,
            span: s.span_from(start),
        };
    }

    Ok(ty)
}

fn parse_base_type(s: &mut TokenStream<'_>) -> PResult<TypeAnnotation> {
    let start = s.offset();
    let Some(token) = s.peek() else {
        return Err(s.unexpected("Must be a type."));
    };

    match token.kind {
        kind if kind.is_primitive_type() => {
            s.advance();
            Ok(TypeAnnotation::Primitive {
                name: token.text.clone(),
                span: s.span_from(start),
            })
        }
        TokenKind::Identifier => {
            s.advance();
            let mut path = vec![token.text.clone()];
            while s.at(TokenKind::Dot) && s.nth_kind(1) == Some(TokenKind::Identifier) {
                s.advance();
                if let Some(segment) = s.advance() {
                    path.push(segment.text.clone());
                }
            }
            Ok(TypeAnnotation::Qualified {
                path,
                span: s.span_from(start),
            })
        }
        TokenKind::Function => {
            s.advance();
            s.expect(TokenKind::LParen, "Missing '('")?;
            let mut params = Vec::new();
            if !s.at(TokenKind::RParen) {
                params.push(parse_type(s)?);
                while s.eat(TokenKind::Comma).is_some() {
                    params.push(parse_type(s)?);
                }
            }
            s.expect(TokenKind::RParen, "Missing ')'")?;
            if s.at(TokenKind::Colon) && s.nth_kind(1).is_some_and(begins_type) {
                s.advance();
            }
            let ret = parse_type(s)?;
            Ok(TypeAnnotation::Function {
                params,
                ret: Box::new(ret),
                span: s.span_from(start),
            })
        }
        TokenKind::LBracket => {
            s.advance();
            let element = parse_type(s)?;
            s.expect(TokenKind::RBracket, "] expected")?;
            Ok(TypeAnnotation::Array {
                element: Box::new(element),
                span: s.span_from(start),
            })
        }
        _ => Err(s.unexpected("Must be a type.")),
    }
}

#[cfg(test)]
mod tests {
    use crate::parsers::zenscript::error::SyntaxError;
    use crate::parsers::zenscript::node::TypeAnnotation;
    use crate::parsers::zenscript::{parse_type, tokenize};

    fn parse_type_str(source: &str) -> Result<TypeAnnotation, SyntaxError> {
        parse_type(&tokenize(source).tokens)
    }

    fn render(source: &str) -> String {
        parse_type_str(source).expect("type should parse").to_string()
    }

    #[test]
    fn test_primitive_and_qualified_types() {
        assert_eq!(render("int"), "int");
        assert_eq!(render("crafttweaker.item.IItemStack"), "crafttweaker.item.IItemStack");
    }

    #[test]
    fn test_associative_suffixes_repeat() {
        assert_eq!(render("string[]"), "string[]");
        assert_eq!(render("int[string][]"), "int[string][]");
    }

    #[test]
    fn test_function_and_array_types() {
        assert_eq!(render("function(int,string)bool"), "function(int,string)bool");
        assert_eq!(render("function(int) : void"), "function(int)void");
        assert_eq!(render("[IItemStack]"), "[IItemStack]");
    }

    #[test]
    fn test_non_type_is_rejected() {
        let error = parse_type_str("+").unwrap_err();
        assert_eq!(error.message, "Must be a type.");
    }
}
