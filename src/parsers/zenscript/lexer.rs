//! Lexical analysis for ZenScript
//!
//! `tokenize` is total: every input produces a complete, ordered token
//! sequence. Characters the token set does not cover become `ERROR` tokens
//! so the parser can report them and keep going. Comments are split off into
//! their own sequence, which completion consults when looking for a `#`
//! preprocessor marker.

use logos::Logos;
use tracing::trace;

use super::token::{Token, TokenKind, TokenSequence};

/// Result of lexing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lexed {
    /// Code tokens (including `ERROR` tokens), in source order.
    pub tokens: TokenSequence,
    /// Comment tokens, in source order.
    pub comments: TokenSequence,
}

/// Tracks line/column while tokens are produced left to right.
struct LineTracker<'src> {
    text: &'src str,
    cursor: usize,
    line: u32,
    line_start: usize,
}

impl<'src> LineTracker<'src> {
    fn new(text: &'src str) -> Self {
        Self {
            text,
            cursor: 0,
            line: 0,
            line_start: 0,
        }
    }

    /// Line and character column of `offset`. Offsets must be non-decreasing.
    fn locate(&mut self, offset: usize) -> (u32, u32) {
        for (i, byte) in self.text.as_bytes()[self.cursor..offset].iter().enumerate() {
            if *byte == b'\n' {
                self.line += 1;
                self.line_start = self.cursor + i + 1;
            }
        }
        self.cursor = offset;
        let column = self.text[self.line_start..offset].chars().count() as u32;
        (self.line, column)
    }
}

/// Convert source text into code and comment token sequences.
pub fn tokenize(text: &str) -> Lexed {
    let mut lexed = Lexed::default();
    let mut lines = LineTracker::new(text);
    let mut lexer = TokenKind::lexer(text);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(kind) => kind,
            Err(()) => TokenKind::Error,
        };

        // Error spans are widened to whole characters so slicing stays valid
        let mut end = span.end.max(span.start + 1).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        let start = span.start;
        let (line, column) = lines.locate(start);
        let token = Token {
            kind,
            text: text[start..end].to_string(),
            start_offset: start,
            end_offset: end - 1,
            line,
            column,
        };

        if kind.is_comment() {
            lexed.comments.push(token);
        } else {
            lexed.tokens.push(token);
        }
    }

    trace!(
        "Lexed {} tokens and {} comments from {} bytes",
        lexed.tokens.len(),
        lexed.comments.len(),
        text.len()
    );
    lexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_override_identifiers() {
        assert_eq!(
            kinds("if iff import importer zenClass"),
            vec![
                TokenKind::If,
                TokenKind::Identifier,
                TokenKind::Import,
                TokenKind::Identifier,
                TokenKind::ZenClass,
            ]
        );
    }

    #[test]
    fn test_to_is_an_identifier() {
        let lexed = tokenize("0 to 10");
        assert_eq!(lexed.tokens[1].kind, TokenKind::Identifier);
        assert_eq!(lexed.tokens[1].text, "to");
    }

    #[test]
    fn test_numeric_and_string_literals() {
        assert_eq!(
            kinds(r#"42 0xFF 1.5 2.0e3 3f "a\"b" 'c'"#),
            vec![
                TokenKind::IntValue,
                TokenKind::IntValue,
                TokenKind::FloatValue,
                TokenKind::FloatValue,
                TokenKind::FloatValue,
                TokenKind::StringValue,
                TokenKind::StringValue,
            ]
        );
    }

    #[test]
    fn test_range_is_not_a_float() {
        assert_eq!(
            kinds("0..10"),
            vec![TokenKind::IntValue, TokenKind::DotDot, TokenKind::IntValue]
        );
    }

    #[test]
    fn test_compound_operators_use_maximal_munch() {
        assert_eq!(
            kinds("a += b || c ~= d <= e"),
            vec![
                TokenKind::Identifier,
                TokenKind::PlusAssign,
                TokenKind::Identifier,
                TokenKind::OrOr,
                TokenKind::Identifier,
                TokenKind::TildeAssign,
                TokenKind::Identifier,
                TokenKind::LtEq,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_comments_are_routed_separately() {
        let lexed = tokenize("#norun\nvar a = 1; // trailing\n/* block\n comment */ a;");
        let comment_kinds: Vec<_> = lexed.comments.iter().map(|t| t.kind).collect();
        assert_eq!(
            comment_kinds,
            vec![
                TokenKind::HashComment,
                TokenKind::LineComment,
                TokenKind::BlockComment,
            ]
        );
        assert_eq!(lexed.comments[0].text, "#norun");
        assert!(lexed.tokens.iter().all(|t| !t.kind.is_comment()));
        assert_eq!(lexed.tokens.len(), 7);
    }

    #[test]
    fn test_block_comment_with_inner_stars() {
        let lexed = tokenize("/* a * b */ x;");
        assert_eq!(kinds("/* a * b */ x;"), vec![TokenKind::Identifier, TokenKind::Semicolon]);
        assert_eq!(lexed.comments.len(), 1);
        assert_eq!(lexed.comments[0].text, "/* a * b */");

        let lexed = tokenize("/**/a;/***/");
        assert_eq!(lexed.tokens.len(), 2);
        assert_eq!(
            lexed.comments.iter().map(|t| t.text.as_str()).collect::<Vec<_>>(),
            vec!["/**/", "/***/"]
        );
    }

    #[test]
    fn test_unrecognized_characters_become_error_tokens() {
        let lexed = tokenize("a @ b");
        assert_eq!(
            lexed.tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![TokenKind::Identifier, TokenKind::Error, TokenKind::Identifier]
        );
        assert_eq!(lexed.tokens[1].text, "@");
    }

    #[test]
    fn test_multibyte_error_token_keeps_char_boundaries() {
        let lexed = tokenize("a é b");
        let error = &lexed.tokens[1];
        assert_eq!(error.kind, TokenKind::Error);
        assert_eq!(error.text, "é");
        assert_eq!(lexed.tokens[2].text, "b");
    }

    #[test]
    fn test_line_and_column_tracking() {
        let lexed = tokenize("var a = 1;\n  print(a);");
        let print = lexed.tokens.iter().find(|t| t.text == "print").unwrap();
        assert_eq!((print.line, print.column), (1, 2));
        assert_eq!(print.start_offset, 13);
        assert_eq!(print.end_offset, 17);
    }

    quickcheck! {
        /// Tokens tile the input: in order, non-overlapping, and each token's
        /// text is exactly the source slice it claims.
        fn prop_tokens_tile_the_input(input: String) -> bool {
            let lexed = tokenize(&input);
            let mut all: Vec<&Token> = lexed.tokens.iter().chain(lexed.comments.iter()).collect();
            all.sort_by_key(|t| t.start_offset);

            let ordered = all.windows(2).all(|w| w[0].end_offset < w[1].start_offset);
            let exact = all.iter().all(|t| input.get(t.range()) == Some(t.text.as_str()));
            let gaps_are_whitespace = {
                let mut covered = vec![false; input.len()];
                for t in &all {
                    for b in t.range() {
                        covered[b] = true;
                    }
                }
                input
                    .char_indices()
                    .filter(|(i, _)| !covered[*i])
                    .all(|(_, c)| matches!(c, ' ' | '\t' | '\r' | '\n' | '\u{c}'))
            };
            ordered && exact && gaps_are_whitespace
        }
    }
}
