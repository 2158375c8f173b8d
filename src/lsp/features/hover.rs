//! Token hover
//!
//! ```text
//! User hovers over text
//!       ↓
//! TokenHover::hover()
//!       ├─→ Find the code token covering the cursor, or the one
//!       │   ending right before it
//!       └─→ Show its kind name over [start, end + 1)
//! ```

use tower_lsp::lsp_types::{Hover, HoverContents, MarkedString, Position, Range};
use tracing::debug;

use crate::lsp::document::DocumentSnapshot;

pub struct TokenHover;

impl TokenHover {
    /// Hover for the token under `position`.
    ///
    /// # Returns
    /// `None` when the cursor is in whitespace, a comment or past the end,
    /// unless it sits directly after a token
    pub fn hover(&self, snapshot: &DocumentSnapshot, position: Position) -> Option<Hover> {
        let offset = snapshot.offset_at(&position);
        let lookup = snapshot.lookup(offset)?;
        if !lookup.exists && lookup.token.end_offset + 1 != offset {
            return None;
        }
        let token = lookup.token;
        debug!("Hover at {:?} on {} {:?}", position, token.kind, token.text);

        let range = Range::new(
            snapshot.position_at(token.start_offset),
            snapshot.position_at(token.end_offset + 1),
        );
        Some(Hover {
            contents: HoverContents::Scalar(MarkedString::String(token.kind.name().to_string())),
            range: Some(range),
        })
    }
}
