//! Expressions, loosest to tightest binding.
//!
//! ```text
//! Assign      := Conditional (assign-op Assign)?
//! Conditional := OrOr ('?' OrOr ':' Conditional)?
//! OrOr        := AndAnd ('||' AndAnd)*
//! AndAnd      := Or ('&&' Or)*
//! Or          := Xor ('|' Xor)*
//! Xor         := And ('^' And)*
//! And         := Compare ('&' Compare)*
//! Compare     := Add (('==' | '!=' | '<' | '<=' | '>' | '>=' | 'in') Add)?
//! Add         := Mul (('+' | '-' | '~') Mul)*
//! Mul         := Unary (('*' | '/' | '%') Unary)*
//! Unary       := ('!' | '-') Unary | Postfix
//! Postfix     := Primary postfix-op*
//! ```
//!
//! The comparison level takes at most one operator, so `a < b < c` leaves
//! the second `<` for the caller to reject.

use crate::parsers::zenscript::node::{
    AssignOp, BinaryOp, Expression, Identifier, Literal, RangeOp, Span, UnaryOp,
};
use crate::parsers::zenscript::stream::{PResult, TokenStream};
use crate::parsers::zenscript::token::TokenKind;

use super::decl::parse_parameters;
use super::stmt::parse_body;
use super::types::{parse_type, parse_type_declaration};

pub(crate) fn parse_expression(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_assign(s)
}

/// Parse an expression, or record the failure and skip to the end of the
/// enclosing statement, yielding an `Error` node in its place.
pub(crate) fn parse_expression_or_error(s: &mut TokenStream<'_>) -> Expression {
    let start = s.offset();
    match parse_expression(s) {
        Ok(expr) => expr,
        Err(error) => {
            let message = error.message.clone();
            s.error(error);
            while let Some(kind) = s.kind() {
                if matches!(kind, TokenKind::Semicolon | TokenKind::RBrace) {
                    break;
                }
                s.advance();
            }
            Expression::Error {
                message,
                span: s.span_from(start),
            }
        }
    }
}

fn assign_op(kind: TokenKind) -> Option<AssignOp> {
    Some(match kind {
        TokenKind::Assign => AssignOp::Assign,
        TokenKind::PlusAssign => AssignOp::Add,
        TokenKind::MinusAssign => AssignOp::Sub,
        TokenKind::TildeAssign => AssignOp::Concat,
        TokenKind::MulAssign => AssignOp::Mul,
        TokenKind::DivAssign => AssignOp::Div,
        TokenKind::ModAssign => AssignOp::Mod,
        TokenKind::OrAssign => AssignOp::Or,
        TokenKind::AndAssign => AssignOp::And,
        TokenKind::XorAssign => AssignOp::Xor,
        _ => return None,
    })
}

fn parse_assign(s: &mut TokenStream<'_>) -> PResult<Expression> {
    s.nested(parse_assignment)
}

fn parse_assignment(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    let target = parse_conditional(s)?;

    let Some(op) = s.kind().and_then(assign_op) else {
        return Ok(target);
    };
    s.advance();
    let value = parse_assign(s)?;
    Ok(Expression::Assign {
        op,
        target: Box::new(target),
        value: Box::new(value),
        span: s.span_from(start),
    })
}

fn parse_conditional(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    let condition = parse_or_or(s)?;

    if s.eat(TokenKind::Question).is_none() {
        return Ok(condition);
    }
    let then_value = parse_or_or(s)?;
    s.expect(TokenKind::Colon, ": expected")?;
    let else_value = s.nested(parse_conditional)?;
    Ok(Expression::Conditional {
        condition: Box::new(condition),
        then_value: Box::new(then_value),
        else_value: Box::new(else_value),
        span: s.span_from(start),
    })
}

/// One left-associative binary level.
fn parse_left_assoc(
    s: &mut TokenStream<'_>,
    operators: &[(TokenKind, BinaryOp)],
    operand: fn(&mut TokenStream<'_>) -> PResult<Expression>,
) -> PResult<Expression> {
    let start = s.offset();
    let mut lhs = operand(s)?;

    while let Some(op) = s
        .kind()
        .and_then(|kind| operators.iter().find(|(k, _)| *k == kind).map(|(_, op)| *op))
    {
        s.advance();
        let rhs = operand(s)?;
        lhs = Expression::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span: s.span_from(start),
        };
    }

    Ok(lhs)
}

fn parse_or_or(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(s, &[(TokenKind::OrOr, BinaryOp::OrOr)], parse_and_and)
}

fn parse_and_and(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(s, &[(TokenKind::AndAnd, BinaryOp::AndAnd)], parse_bit_or)
}

fn parse_bit_or(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(s, &[(TokenKind::Or, BinaryOp::BitOr)], parse_bit_xor)
}

fn parse_bit_xor(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(s, &[(TokenKind::Xor, BinaryOp::BitXor)], parse_bit_and)
}

fn parse_bit_and(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(s, &[(TokenKind::And, BinaryOp::BitAnd)], parse_compare)
}

fn compare_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        TokenKind::In => BinaryOp::In,
        _ => return None,
    })
}

fn parse_compare(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    let lhs = parse_additive(s)?;

    let Some(op) = s.kind().and_then(compare_op) else {
        return Ok(lhs);
    };
    s.advance();
    let rhs = parse_additive(s)?;
    Ok(Expression::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span: s.span_from(start),
    })
}

fn parse_additive(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(
        s,
        &[
            (TokenKind::Plus, BinaryOp::Add),
            (TokenKind::Minus, BinaryOp::Sub),
            (TokenKind::Tilde, BinaryOp::Concat),
        ],
        parse_multiplicative,
    )
}

fn parse_multiplicative(s: &mut TokenStream<'_>) -> PResult<Expression> {
    parse_left_assoc(
        s,
        &[
            (TokenKind::Mul, BinaryOp::Mul),
            (TokenKind::Div, BinaryOp::Div),
            (TokenKind::Mod, BinaryOp::Mod),
        ],
        parse_unary,
    )
}

fn parse_unary(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    let op = match s.kind() {
        Some(TokenKind::Not) => UnaryOp::Not,
        Some(TokenKind::Minus) => UnaryOp::Neg,
        _ => return parse_postfix(s),
    };
    s.advance();
    let operand = s.nested(parse_unary)?;
    Ok(Expression::Unary {
        op,
        operand: Box::new(operand),
        span: s.span_from(start),
    })
}

/// `to` is an ordinary identifier everywhere except directly after an
/// operand, where it spells a range.
fn at_contextual_to(s: &TokenStream<'_>) -> bool {
    s.peek()
        .is_some_and(|t| t.kind == TokenKind::Identifier && t.text == "to")
}

fn parse_postfix(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    let mut expr = parse_primary(s)?;

    loop {
        expr = match s.kind() {
            Some(TokenKind::Dot) => {
                s.advance();
                let member = match s.peek() {
                    Some(t)
                        if matches!(
                            t.kind,
                            TokenKind::Identifier | TokenKind::Version | TokenKind::StringValue
                        ) =>
                    {
                        s.advance();
                        Identifier::from_token(t)
                    }
                    _ => return Err(s.unexpected("Identifier expected.")),
                };
                Expression::Member {
                    object: Box::new(expr),
                    member,
                    span: s.span_from(start),
                }
            }
            Some(TokenKind::DotDot) => {
                s.advance();
                let to = parse_assign(s)?;
                Expression::Range {
                    op: RangeOp::DotDot,
                    from: Box::new(expr),
                    to: Box::new(to),
                    span: s.span_from(start),
                }
            }
            Some(TokenKind::Identifier) if at_contextual_to(s) => {
                s.advance();
                let to = parse_assign(s)?;
                Expression::Range {
                    op: RangeOp::To,
                    from: Box::new(expr),
                    to: Box::new(to),
                    span: s.span_from(start),
                }
            }
            Some(TokenKind::LBracket) => {
                s.advance();
                let index = parse_assign(s)?;
                s.expect(TokenKind::RBracket, "] expected")?;
                let value = if s.eat(TokenKind::Assign).is_some() {
                    Some(Box::new(parse_assign(s)?))
                } else {
                    None
                };
                Expression::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    value,
                    span: s.span_from(start),
                }
            }
            Some(TokenKind::LParen) => {
                s.advance();
                let mut args = Vec::new();
                if !s.at(TokenKind::RParen) {
                    args.push(parse_assign(s)?);
                    while s.eat(TokenKind::Comma).is_some() {
                        args.push(parse_assign(s)?);
                    }
                }
                s.expect(TokenKind::RParen, "Missing ')'")?;
                Expression::Call {
                    callee: Box::new(expr),
                    args,
                    span: s.span_from(start),
                }
            }
            Some(TokenKind::As) => {
                s.advance();
                let ty = parse_type(s)?;
                Expression::Cast {
                    expr: Box::new(expr),
                    ty,
                    span: s.span_from(start),
                }
            }
            Some(TokenKind::InstanceOf) => {
                s.advance();
                let ty = parse_type(s)?;
                Expression::InstanceOf {
                    expr: Box::new(expr),
                    ty,
                    span: s.span_from(start),
                }
            }
            _ => break,
        };
    }

    Ok(expr)
}

fn parse_primary(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    let Some(token) = s.peek() else {
        return Err(s.unexpected("Expression expected"));
    };

    let literal = match token.kind {
        TokenKind::IntValue => Some(Literal::Int(token.text.clone())),
        TokenKind::FloatValue => Some(Literal::Float(token.text.clone())),
        TokenKind::StringValue => Some(Literal::String(token.text.clone())),
        TokenKind::True => Some(Literal::Bool(true)),
        TokenKind::False => Some(Literal::Bool(false)),
        TokenKind::Null => Some(Literal::Null),
        _ => None,
    };
    if let Some(value) = literal {
        s.advance();
        return Ok(Expression::Literal {
            value,
            span: Span::of(token),
        });
    }

    match token.kind {
        TokenKind::Identifier => {
            s.advance();
            Ok(Expression::Identifier(Identifier::from_token(token)))
        }
        TokenKind::Function => {
            s.advance();
            let params = parse_parameters(s)?;
            let return_type = parse_type_declaration(s)?;
            let body = parse_body(s)?;
            Ok(Expression::Lambda {
                params,
                return_type,
                body,
                span: s.span_from(start),
            })
        }
        TokenKind::Lt => parse_bracket_handler(s),
        TokenKind::LBracket => {
            s.advance();
            let mut elements = Vec::new();
            while !s.at(TokenKind::RBracket) && !s.at_end() {
                elements.push(parse_assign(s)?);
                if s.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            s.expect(TokenKind::RBracket, "] expected")?;
            Ok(Expression::Array {
                elements,
                span: s.span_from(start),
            })
        }
        TokenKind::LBrace => {
            s.advance();
            let mut entries = Vec::new();
            while !s.at(TokenKind::RBrace) && !s.at_end() {
                let key = parse_assign(s)?;
                s.expect(TokenKind::Colon, ": expected")?;
                let value = parse_assign(s)?;
                entries.push((key, value));
                if s.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            s.expect(TokenKind::RBrace, "} expected")?;
            Ok(Expression::Map {
                entries,
                span: s.span_from(start),
            })
        }
        TokenKind::LParen => {
            s.advance();
            let inner = parse_assign(s)?;
            s.expect(TokenKind::RParen, "Missing ')'")?;
            Ok(Expression::Paren {
                inner: Box::new(inner),
                span: s.span_from(start),
            })
        }
        _ => Err(s.unexpected("Expression expected")),
    }
}

/// `< segment (: segment)* >`, where a segment is a run of any tokens
/// except the angle brackets, the colon and `;`.
fn parse_bracket_handler(s: &mut TokenStream<'_>) -> PResult<Expression> {
    let start = s.offset();
    s.advance();

    let mut segments = Vec::new();
    loop {
        let mut segment = String::new();
        while let Some(token) = s.peek().filter(|t| t.kind.is_bracket_handler_item()) {
            segment.push_str(&token.text);
            s.advance();
        }
        if segment.is_empty() {
            return Err(s.unexpected("Bracket handler content expected"));
        }
        segments.push(segment);
        if s.eat(TokenKind::Colon).is_none() {
            break;
        }
    }

    s.expect(TokenKind::Gt, "> expected")?;
    Ok(Expression::BracketHandler {
        segments,
        span: s.span_from(start),
    })
}

#[cfg(test)]
mod tests {
    use crate::parsers::zenscript::{SyntaxErrorKind, parse_expression, tokenize};

    fn render(source: &str) -> String {
        let parsed = parse_expression(&tokenize(source).tokens);
        assert!(parsed.errors.is_empty(), "{source}: {:?}", parsed.errors);
        parsed.node.to_string()
    }

    #[test]
    fn test_multiplicative_binds_tighter_than_additive() {
        assert_eq!(render("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(render("1 * 2 + 3"), "(+ (* 1 2) 3)");
    }

    #[test]
    fn test_additive_is_left_associative() {
        assert_eq!(render("a - b - c"), "(- (- a b) c)");
        assert_eq!(render("a ~ b + c"), "(+ (~ a b) c)");
    }

    #[test]
    fn test_bitwise_levels() {
        assert_eq!(render("2 ^ 3 | 1"), "(| (^ 2 3) 1)");
        assert_eq!(render("a | b & c"), "(| a (& b c))");
        assert_eq!(render("a || b && c"), "(|| a (&& b c))");
    }

    #[test]
    fn test_assignment_is_right_associative() {
        assert_eq!(render("a = b = c"), "(= a (= b c))");
        assert_eq!(render("a += b ~= c"), "(+= a (~= b c))");
    }

    #[test]
    fn test_conditional_nests_in_else_branch() {
        assert_eq!(render("a ? b : c ? d : e"), "(? a b (? c d e))");
    }

    #[test]
    fn test_unary_is_right_recursive() {
        assert_eq!(render("!-a"), "(! (- a))");
        assert_eq!(render("-a * b"), "(* (- a) b)");
    }

    #[test]
    fn test_postfix_chain_left_to_right() {
        assert_eq!(
            render("recipes.remove(<item:minecraft:stone>)"),
            "(call (. recipes remove) <item:minecraft:stone>)"
        );
        assert_eq!(render("a[0] = 5"), "([]= a 0 5)");
        assert_eq!(render("x as int[]"), "(as x int[])");
        assert_eq!(render("x instanceof IItemStack"), "(instanceof x IItemStack)");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(render("0 .. 10"), "(.. 0 10)");
        assert_eq!(render("0 to 10"), "(to 0 10)");
    }

    #[test]
    fn test_membership_comparison() {
        assert_eq!(render("x in list"), "(in x list)");
    }

    #[test]
    fn test_collection_literals() {
        assert_eq!(render("[1, 2, 3,]"), "(array 1 2 3)");
        assert_eq!(render("{a: 1, b: 2}"), "(map (a 1) (b 2))");
        assert_eq!(render("(a + b) * c"), "(* (paren (+ a b)) c)");
    }

    #[test]
    fn test_lambda_literal() {
        assert_eq!(render("function(a, b) { return a; }"), "(function (a b))");
    }

    #[test]
    fn test_bracket_handler_segments_concatenate_lexemes() {
        assert_eq!(render("<ore:ingot*>"), "<ore:ingot*>");
        assert_eq!(render("<item:minecraft:wool:1>"), "<item:minecraft:wool:1>");
    }

    #[test]
    fn test_chained_comparison_is_rejected() {
        let parsed = parse_expression(&tokenize("a < b < c").tokens);
        assert_eq!(parsed.node.to_string(), "(< a b)");
        assert!(!parsed.errors.is_empty());
    }

    #[test]
    fn test_nesting_depth_is_limited() {
        let shallow = format!("{}a{}", "(".repeat(20), ")".repeat(20));
        assert!(parse_expression(&tokenize(&shallow).tokens).errors.is_empty());

        let deep = format!("{}a{}", "(".repeat(40), ")".repeat(40));
        let parsed = parse_expression(&tokenize(&deep).tokens);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].kind, SyntaxErrorKind::NestingLimit);

        let negations = format!("{}a", "!".repeat(40));
        let parsed = parse_expression(&tokenize(&negations).tokens);
        assert_eq!(parsed.errors.len(), 1);
        assert_eq!(parsed.errors[0].kind, SyntaxErrorKind::NestingLimit);
    }
}
