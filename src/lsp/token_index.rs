//! Offset to token lookup over an ordered token sequence.
//!
//! Tokens are sorted and non-overlapping, so a binary search either finds
//! the token covering an offset or collapses on the gap the offset falls
//! into. A miss still reports the nearest token to the left of that gap,
//! which completion uses to look backwards from the cursor.

use crate::parsers::zenscript::Token;

/// Result of [`find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLookup<'t> {
    /// `true` when `token` covers the queried offset.
    pub exists: bool,
    /// Index of `token` in the sequence.
    pub position: usize,
    pub token: &'t Token,
}

impl<'t> TokenLookup<'t> {
    /// The covering token, discarding fallback results.
    pub fn hit(self) -> Option<&'t Token> {
        self.exists.then_some(self.token)
    }
}

/// Locate the token covering `offset`.
///
/// # Arguments
/// * `tokens` - Sequence ordered by offset with no overlaps
/// * `offset` - Byte offset into the document
///
/// # Returns
/// `None` only for an empty sequence. Otherwise a hit, or a miss whose
/// `position` is the last token ending before `offset` (clamped to 0 when
/// `offset` precedes the first token).
pub fn find(tokens: &[Token], offset: usize) -> Option<TokenLookup<'_>> {
    if tokens.is_empty() {
        return None;
    }

    let mut start = 0usize;
    let mut end = tokens.len();
    while start < end {
        let mid = start + (end - start) / 2;
        let token = &tokens[mid];
        if token.covers(offset) {
            return Some(TokenLookup {
                exists: true,
                position: mid,
                token,
            });
        } else if token.start_offset > offset {
            end = mid;
        } else {
            start = mid + 1;
        }
    }

    let position = start.saturating_sub(1);
    Some(TokenLookup {
        exists: false,
        position,
        token: &tokens[position],
    })
}

/// The token covering `offset`, if any.
pub fn token_at(tokens: &[Token], offset: usize) -> Option<&Token> {
    find(tokens, offset).and_then(TokenLookup::hit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::zenscript::tokenize;
    use quickcheck::quickcheck;

    #[test]
    fn test_hit_inside_token() {
        let lexed = tokenize("var answer = 42;");
        let lookup = find(&lexed.tokens, 6).unwrap();
        assert!(lookup.exists);
        assert_eq!(lookup.position, 1);
        assert_eq!(lookup.token.text, "answer");
    }

    #[test]
    fn test_token_boundaries_are_inclusive() {
        let lexed = tokenize("abc def");
        assert_eq!(token_at(&lexed.tokens, 0).map(|t| t.text.as_str()), Some("abc"));
        assert_eq!(token_at(&lexed.tokens, 2).map(|t| t.text.as_str()), Some("abc"));
        assert_eq!(token_at(&lexed.tokens, 4).map(|t| t.text.as_str()), Some("def"));
    }

    #[test]
    fn test_gap_falls_back_to_left_neighbour() {
        let lexed = tokenize("abc   def");
        let lookup = find(&lexed.tokens, 4).unwrap();
        assert!(!lookup.exists);
        assert_eq!(lookup.token.text, "abc");
    }

    #[test]
    fn test_offsets_outside_the_sequence_are_clamped() {
        let lexed = tokenize("  abc def");
        let before = find(&lexed.tokens, 0).unwrap();
        assert!(!before.exists);
        assert_eq!(before.position, 0);

        let after = find(&lexed.tokens, 100).unwrap();
        assert!(!after.exists);
        assert_eq!(after.position, 1);
    }

    #[test]
    fn test_empty_sequence() {
        assert!(find(&[], 0).is_none());
    }

    quickcheck! {
        fn prop_find_agrees_with_linear_scan(input: String, offset: usize) -> bool {
            let tokens = tokenize(&input).tokens;
            let offset = offset % (input.len() + 2);
            match find(&tokens, offset) {
                None => tokens.is_empty(),
                Some(lookup) => {
                    let covering = tokens.iter().position(|t| t.covers(offset));
                    match covering {
                        Some(index) => lookup.exists && lookup.position == index,
                        None => {
                            let left = tokens.iter().rposition(|t| t.end_offset < offset).unwrap_or(0);
                            !lookup.exists && lookup.position == left
                        }
                    }
                }
            }
        }
    }
}
