//! Completion intent detection.
//!
//! Given a document snapshot, a cursor offset and the trigger character the
//! client reported (if any), decide which kind of completion is wanted. When
//! the request was invoked manually the trigger is inferred from the text
//! around the cursor, in order:
//!
//! 1. no code token left of the cursor: a `#name` comment being typed means a
//!    preprocessor directive
//! 2. the line so far is an unfinished `import` path
//! 3. the line so far has an open `<handler:...` literal
//! 4. the token left of the cursor is itself a trigger (`# . : <`)
//! 5. the token before that is a trigger; the offset is rewound to the start
//!    of the partially typed word
//!
//! Anything that matches nothing is a generic completion.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use crate::lsp::document::DocumentSnapshot;
use crate::lsp::token_index;
use crate::parsers::zenscript::{Token, TokenKind};

use super::bracket_handler::{BracketHandlerRegistry, DEFAULT_HANDLER};
use super::item::{TRIGGER_COLON, TRIGGER_DOT, TRIGGER_LT, TRIGGER_PREPROCESSOR};

static UNFINISHED_IMPORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"import [^.]*$").unwrap());

static OPEN_BRACKET_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^:<>]+:)+[^:<>]*$").unwrap());

static PREPROCESSOR_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\w*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionCategory {
    /// `#` directive at the start of a line.
    Preprocessor,
    /// Package path after `import`; `chain` holds the segments typed so far.
    Import { chain: Vec<String> },
    /// Dotted access outside an import.
    MemberAccess { chain: Vec<String> },
    /// `<` just typed. `manual` is set when the user asked for completion
    /// rather than the editor firing on the character.
    BracketHandlerStart { manual: bool },
    /// Inside `<a:b:...`; `segments` are the complete segments before the cursor.
    BracketHandlerPath { segments: Vec<String> },
    Generic,
    /// A space that does not follow `import`.
    Suppressed,
}

impl CompletionCategory {
    /// Trigger recorded in the items produced for this category.
    pub fn trigger_character(&self) -> Option<&'static str> {
        match self {
            Self::Preprocessor => Some(TRIGGER_PREPROCESSOR),
            Self::Import { .. } | Self::MemberAccess { .. } => Some(TRIGGER_DOT),
            Self::BracketHandlerStart { .. } => Some(TRIGGER_LT),
            Self::BracketHandlerPath { .. } => Some(TRIGGER_COLON),
            Self::Generic | Self::Suppressed => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContext {
    pub category: CompletionCategory,
    /// Offset the category is anchored at, after any rewind.
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Hash,
    Dot,
    Colon,
    Lt,
    Space,
    Import,
}

impl Anchor {
    fn from_trigger(trigger: &str) -> Option<Self> {
        match trigger {
            "#" => Some(Self::Hash),
            "." => Some(Self::Dot),
            ":" => Some(Self::Colon),
            "<" => Some(Self::Lt),
            " " => Some(Self::Space),
            _ => None,
        }
    }

    /// Only punctuation tokens can anchor a manual request.
    fn from_token(token: &Token) -> Option<Self> {
        match token.text.as_str() {
            "#" | "." | ":" | "<" => Self::from_trigger(&token.text),
            _ => None,
        }
    }
}

/// `import` heads a chain and never appears inside one.
fn is_chain_segment(token: &Token) -> bool {
    token.kind == TokenKind::Identifier
        || (token.kind.is_keyword() && token.kind != TokenKind::Import)
}

/// Resolves completion intent against the handler families of `registry`.
#[derive(Debug, Clone, Copy)]
pub struct CompletionContextResolver<'r> {
    registry: &'r BracketHandlerRegistry,
}

impl<'r> CompletionContextResolver<'r> {
    pub fn new(registry: &'r BracketHandlerRegistry) -> Self {
        Self { registry }
    }

    /// # Arguments
    /// * `snapshot` - Current state of the document
    /// * `offset` - Cursor byte offset
    /// * `trigger` - Trigger character reported by the client, `None` when
    ///   completion was invoked manually
    pub fn resolve(
        &self,
        snapshot: &DocumentSnapshot,
        offset: usize,
        trigger: Option<&str>,
    ) -> ResolvedContext {
        let offset = offset.min(snapshot.text.len());
        let manual = trigger.is_none();
        let (anchor, offset) = match trigger {
            Some(trigger) => (Anchor::from_trigger(trigger), offset),
            None => self.infer_anchor(snapshot, offset),
        };

        let category = match anchor {
            Some(Anchor::Hash) => CompletionCategory::Preprocessor,
            Some(Anchor::Import) => CompletionCategory::Import { chain: Vec::new() },
            Some(Anchor::Space) => self.after_space(snapshot, offset),
            Some(Anchor::Dot) => self.after_dot(snapshot, offset),
            Some(Anchor::Colon) => self.after_colon(snapshot, offset),
            Some(Anchor::Lt) => CompletionCategory::BracketHandlerStart { manual },
            None => CompletionCategory::Generic,
        };
        trace!("Completion at {} ({:?}) resolved to {:?}", offset, trigger, category);
        ResolvedContext { category, offset }
    }

    fn infer_anchor(&self, snapshot: &DocumentSnapshot, offset: usize) -> (Option<Anchor>, usize) {
        let Some(previous) = offset.checked_sub(1) else {
            return (None, offset);
        };
        let token = token_index::token_at(&snapshot.tokens, previous);

        if token.is_none() {
            if let Some(comment) = token_index::token_at(&snapshot.comments, previous) {
                if comment.kind == TokenKind::HashComment
                    && PREPROCESSOR_MARKER.is_match(&comment.text)
                {
                    return (Some(Anchor::Hash), offset);
                }
            }
        }

        let line = line_before(&snapshot.text, offset);
        if UNFINISHED_IMPORT.is_match(line) {
            return (Some(Anchor::Import), offset);
        }
        if OPEN_BRACKET_HANDLER.is_match(line) {
            return (Some(Anchor::Colon), offset);
        }

        let Some(token) = token else {
            return (None, offset);
        };
        if let Some(anchor) = Anchor::from_token(token) {
            return (Some(anchor), offset);
        }
        let before = token
            .start_offset
            .checked_sub(1)
            .and_then(|o| token_index::token_at(&snapshot.tokens, o));
        match before.and_then(Anchor::from_token) {
            Some(anchor) => (Some(anchor), token.start_offset),
            None => (None, offset),
        }
    }

    /// `import ` followed by the cursor reopens the package list; any
    /// other space is ignored.
    fn after_space(&self, snapshot: &DocumentSnapshot, offset: usize) -> CompletionCategory {
        let bytes = snapshot.text.as_bytes();
        let mut end = offset;
        while end > 0 && bytes[end - 1] == b' ' {
            end -= 1;
        }
        let preceding = end
            .checked_sub(1)
            .and_then(|o| token_index::token_at(&snapshot.tokens, o));
        match preceding {
            Some(token) if token.kind == TokenKind::Import => {
                CompletionCategory::Import { chain: Vec::new() }
            }
            _ => CompletionCategory::Suppressed,
        }
    }

    /// Collect `a.b.` backwards from the dot left of the cursor.
    fn after_dot(&self, snapshot: &DocumentSnapshot, offset: usize) -> CompletionCategory {
        let tokens = &snapshot.tokens;
        let dot = offset
            .checked_sub(1)
            .and_then(|o| token_index::find(tokens, o))
            .filter(|lookup| lookup.exists && lookup.token.kind == TokenKind::Dot);
        let Some(dot) = dot else {
            return CompletionCategory::Generic;
        };

        let mut chain = Vec::new();
        let mut pos = dot.position;
        while tokens[pos].kind == TokenKind::Dot && pos >= 1 && is_chain_segment(&tokens[pos - 1]) {
            chain.push(tokens[pos - 1].text.clone());
            if pos < 2 {
                pos = 0;
                break;
            }
            pos -= 2;
        }
        chain.reverse();

        let head = &tokens[pos];
        if head.kind == TokenKind::Import && !chain.is_empty() {
            CompletionCategory::Import { chain }
        } else if chain.is_empty() {
            CompletionCategory::Generic
        } else {
            CompletionCategory::MemberAccess { chain }
        }
    }

    /// Split the open literal `<a:b:` into `["a", "b"]`, prefixing the
    /// default family when `a` is not a family name.
    fn after_colon(&self, snapshot: &DocumentSnapshot, offset: usize) -> CompletionCategory {
        let line = line_before(&snapshot.text, offset);
        if !OPEN_BRACKET_HANDLER.is_match(line) {
            return CompletionCategory::Generic;
        }
        let (Some(open), Some(colon)) = (line.rfind('<'), line.rfind(':')) else {
            return CompletionCategory::Generic;
        };

        let mut segments: Vec<String> = line[open + 1..colon]
            .split(':')
            .map(str::to_string)
            .collect();
        if !self.registry.contains(&segments[0]) {
            segments.insert(0, DEFAULT_HANDLER.to_string());
        }
        CompletionCategory::BracketHandlerPath { segments }
    }
}

/// Text from the start of the line holding `offset - 1` up to `offset`.
fn line_before(text: &str, offset: usize) -> &str {
    let probe = offset.saturating_sub(1);
    let start = text.as_bytes()[..probe]
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |newline| newline + 1);
    &text[start..offset]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::features::completion::catalogs::ItemCatalog;
    use std::sync::Arc;

    fn resolve(source: &str, trigger: Option<&str>) -> ResolvedContext {
        let registry = BracketHandlerRegistry::with_defaults(Arc::new(ItemCatalog::default()));
        let snapshot = DocumentSnapshot::build(source.to_string(), 0);
        CompletionContextResolver::new(&registry).resolve(&snapshot, source.len(), trigger)
    }

    fn strings(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_line_before() {
        assert_eq!(line_before("a\nbc", 4), "bc");
        assert_eq!(line_before("a\n", 2), "a\n");
        assert_eq!(line_before("", 0), "");
    }

    #[test]
    fn test_dot_after_import() {
        let resolved = resolve("import crafttweaker.item.", Some("."));
        assert_eq!(
            resolved.category,
            CompletionCategory::Import {
                chain: strings(&["crafttweaker", "item"])
            }
        );
    }

    #[test]
    fn test_dot_outside_import() {
        assert_eq!(
            resolve("recipes.", Some(".")).category,
            CompletionCategory::MemberAccess {
                chain: strings(&["recipes"])
            }
        );
        assert_eq!(resolve("1 + .", Some(".")).category, CompletionCategory::Generic);
    }

    #[test]
    fn test_dot_right_after_import_keyword() {
        assert_eq!(resolve("import.", Some(".")).category, CompletionCategory::Generic);
        assert_eq!(
            resolve("print(1);
import.", Some(".")).category,
            CompletionCategory::Generic
        );
    }

    #[test]
    fn test_colon_outside_bracket_handler() {
        assert_eq!(resolve("a ? b :", Some(":")).category, CompletionCategory::Generic);
    }

    #[test]
    fn test_space_trigger() {
        assert_eq!(
            resolve("import  ", Some(" ")).category,
            CompletionCategory::Import { chain: Vec::new() }
        );
        assert_eq!(resolve("var x ", Some(" ")).category, CompletionCategory::Suppressed);
        assert_eq!(resolve(" ", Some(" ")).category, CompletionCategory::Suppressed);
    }

    #[test]
    fn test_lt_trigger_and_manual() {
        assert_eq!(
            resolve("val a = <", Some("<")).category,
            CompletionCategory::BracketHandlerStart { manual: false }
        );
        assert_eq!(
            resolve("val a = <", None).category,
            CompletionCategory::BracketHandlerStart { manual: true }
        );
    }

    #[test]
    fn test_manual_rewinds_to_anchor() {
        let resolved = resolve("import foo.ba", None);
        assert_eq!(
            resolved.category,
            CompletionCategory::Import {
                chain: strings(&["foo"])
            }
        );
        assert_eq!(resolved.offset, 11);
    }

    #[test]
    fn test_manual_unfinished_import() {
        assert_eq!(
            resolve("import cra", None).category,
            CompletionCategory::Import { chain: Vec::new() }
        );
    }

    #[test]
    fn test_manual_open_bracket_handler() {
        assert_eq!(
            resolve("recipes.remove(<item:minecraft:app", None).category,
            CompletionCategory::BracketHandlerPath {
                segments: strings(&["item", "minecraft"])
            }
        );
    }

    #[test]
    fn test_manual_closed_bracket_handler_is_generic() {
        assert_eq!(resolve("<item:minecraft:apple> ", None).category, CompletionCategory::Generic);
    }

    #[test]
    fn test_manual_preprocessor_in_comment() {
        assert_eq!(resolve("#norun", None).category, CompletionCategory::Preprocessor);
        assert_eq!(resolve("# just a note", None).category, CompletionCategory::Generic);
    }

    #[test]
    fn test_manual_plain_identifier_is_generic() {
        assert_eq!(resolve("var x = rec", None).category, CompletionCategory::Generic);
        assert_eq!(resolve("", None).category, CompletionCategory::Generic);
    }

    #[test]
    fn test_trigger_characters() {
        assert_eq!(CompletionCategory::Preprocessor.trigger_character(), Some("#"));
        assert_eq!(
            CompletionCategory::BracketHandlerPath { segments: Vec::new() }.trigger_character(),
            Some(":")
        );
        assert_eq!(CompletionCategory::Generic.trigger_character(), None);
    }
}
