use std::sync::Arc;

use ropey::Rope;
use tracing::{debug, trace};

use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent, Url};

use crate::lsp::settings::ZenScriptSettings;
use crate::lsp::token_index::{self, TokenLookup};
use crate::parsers::zenscript::{Token, parse, tokenize};

pub use crate::lsp::models::{DocumentSession, DocumentSessionState, DocumentSnapshot};

/// Converts an LSP position to a char index in the Rope, clamping past-the-end
/// lines and columns.
fn position_to_char_index(position: &Position, text: &Rope) -> usize {
    let line = position.line as usize;
    if line >= text.len_lines() {
        return text.len_chars();
    }
    let line_start = text.line_to_char(line);
    let line_len = text.line(line).len_chars();
    line_start + (position.character as usize).min(line_len)
}

impl DocumentSnapshot {
    /// Tokenize and parse `text` from scratch.
    pub fn build(text: String, version: i32) -> Self {
        let lexed = tokenize(&text);
        let tree = parse(&lexed.tokens);
        trace!(
            "Built snapshot v{}: {} tokens, {} comments, {} errors",
            version,
            lexed.tokens.len(),
            lexed.comments.len(),
            tree.errors.len()
        );
        Self {
            version,
            rope: Rope::from_str(&text),
            text,
            tokens: lexed.tokens,
            comments: lexed.comments,
            tree,
        }
    }

    /// Byte offset of an LSP position.
    pub fn offset_at(&self, position: &Position) -> usize {
        let char_index = position_to_char_index(position, &self.rope);
        self.rope.char_to_byte(char_index)
    }

    /// LSP position of a byte offset; offsets past the end map to the end.
    pub fn position_at(&self, offset: usize) -> Position {
        let byte = offset.min(self.rope.len_bytes());
        let char_index = self.rope.byte_to_char(byte);
        let line = self.rope.char_to_line(char_index);
        let column = char_index - self.rope.line_to_char(line);
        Position::new(line as u32, column as u32)
    }

    pub fn lookup(&self, offset: usize) -> Option<TokenLookup<'_>> {
        token_index::find(&self.tokens, offset)
    }

    /// The code token covering `offset`.
    pub fn token_at(&self, offset: usize) -> Option<&Token> {
        token_index::token_at(&self.tokens, offset)
    }

    /// The comment token covering `offset`.
    pub fn comment_at(&self, offset: usize) -> Option<&Token> {
        token_index::token_at(&self.comments, offset)
    }
}

impl DocumentSession {
    pub fn new(id: u32, uri: Url, text: String, version: i32) -> Self {
        Self {
            id,
            uri,
            state: tokio::sync::RwLock::new(DocumentSessionState {
                snapshot: Arc::new(DocumentSnapshot::build(text, version)),
                settings: None,
            }),
        }
    }

    /// Returns the latest snapshot.
    pub async fn snapshot(&self) -> Arc<DocumentSnapshot> {
        self.state.read().await.snapshot.clone()
    }

    /// Applies content changes and rebuilds the snapshot.
    ///
    /// Returns `None` without touching the document when `version` is not
    /// newer than the current one.
    pub async fn apply(
        &self,
        changes: Vec<TextDocumentContentChangeEvent>,
        version: i32,
    ) -> Option<Arc<DocumentSnapshot>> {
        let mut state = self.state.write().await;
        let current = &state.snapshot;
        if version <= current.version {
            debug!(
                "Ignoring stale change for {}: v{} <= v{}",
                self.uri, version, current.version
            );
            return None;
        }

        let mut text = current.rope.clone();
        for change in &changes {
            if let Some(range) = change.range {
                let start = position_to_char_index(&range.start, &text);
                let end = position_to_char_index(&range.end, &text).max(start);
                text.remove(start..end);
                text.insert(start, &change.text);
            } else {
                text = Rope::from_str(&change.text);
            }
        }

        let snapshot = Arc::new(DocumentSnapshot::build(text.to_string(), version));
        state.snapshot = snapshot.clone();
        Some(snapshot)
    }

    pub async fn settings(&self) -> Option<ZenScriptSettings> {
        self.state.read().await.settings.clone()
    }

    pub async fn set_settings(&self, settings: ZenScriptSettings) {
        self.state.write().await.settings = Some(settings);
    }

    pub async fn clear_settings(&self) {
        self.state.write().await.settings = None;
    }
}
