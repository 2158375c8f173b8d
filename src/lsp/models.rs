use std::sync::Arc;

use ropey::Rope;

use tower_lsp::lsp_types::Url;

use crate::lsp::settings::ZenScriptSettings;
use crate::parsers::zenscript::{ParseTree, TokenSequence};

/// Everything derived from one version of a document.
///
/// Built in full on every change and never mutated afterwards, so readers
/// holding an `Arc` to an older snapshot keep a consistent view.
#[derive(Debug)]
pub struct DocumentSnapshot {
    pub version: i32,
    pub text: String,
    pub rope: Rope,
    pub tokens: TokenSequence,
    pub comments: TokenSequence,
    pub tree: ParseTree,
}

/// Mutable part of a document session.
#[derive(Debug)]
pub struct DocumentSessionState {
    pub snapshot: Arc<DocumentSnapshot>,
    /// Settings fetched from the client, cleared on configuration change.
    pub settings: Option<ZenScriptSettings>,
}

/// A document known to the server, either opened by the editor or found by
/// the workspace scan.
#[derive(Debug)]
pub struct DocumentSession {
    pub id: u32,
    pub uri: Url,
    pub state: tokio::sync::RwLock<DocumentSessionState>,
}
