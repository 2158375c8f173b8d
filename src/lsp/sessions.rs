//! Owner of all document sessions.
//!
//! A session is created when a document is opened or discovered by the
//! workspace scan and disposed when the editor closes it. Each session only
//! ever swaps its own snapshot, so the map itself needs no outer lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use dashmap::DashMap;
use tracing::debug;

use tower_lsp::lsp_types::Url;

use crate::lsp::document::DocumentSession;

#[derive(Debug, Default)]
pub struct DocumentSessionManager {
    sessions: DashMap<Url, Arc<DocumentSession>>,
    serial_id: AtomicU32,
}

impl DocumentSessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace the session for `uri`.
    pub fn open(&self, uri: Url, text: String, version: i32) -> Arc<DocumentSession> {
        let id = self.serial_id.fetch_add(1, Ordering::Relaxed);
        let session = Arc::new(DocumentSession::new(id, uri.clone(), text, version));
        debug!("Opened session {} for {}", id, uri);
        self.sessions.insert(uri, session.clone());
        session
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentSession>> {
        self.sessions.get(uri).map(|entry| entry.value().clone())
    }

    pub fn close(&self, uri: &Url) -> Option<Arc<DocumentSession>> {
        let removed = self.sessions.remove(uri).map(|(_, session)| session);
        if let Some(session) = &removed {
            debug!("Closed session {} for {}", session.id, uri);
        }
        removed
    }

    /// Drop cached settings of every session.
    pub async fn clear_settings(&self) {
        let sessions: Vec<_> = self.sessions.iter().map(|entry| entry.value().clone()).collect();
        for session in sessions {
            session.clear_settings().await;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsp::settings::ZenScriptSettings;
    use tower_lsp::lsp_types::TextDocumentContentChangeEvent;

    fn uri(name: &str) -> Url {
        Url::parse(&format!("file:///scripts/{name}")).unwrap()
    }

    #[tokio::test]
    async fn test_open_edit_close() {
        let manager = DocumentSessionManager::new();
        let first = manager.open(uri("a.zs"), "a;".to_string(), 0);
        let second = manager.open(uri("b.zs"), "b;".to_string(), 0);
        assert_ne!(first.id, second.id);
        assert_eq!(manager.len(), 2);

        let session = manager.get(&uri("a.zs")).unwrap();
        let change = TextDocumentContentChangeEvent {
            range: None,
            range_length: None,
            text: "c;".to_string(),
        };
        let snapshot = session.apply(vec![change], 1).await;
        assert_eq!(snapshot.map(|s| s.text.clone()).as_deref(), Some("c;"));
        assert!(manager.get(&uri("missing.zs")).is_none());

        assert!(manager.close(&uri("a.zs")).is_some());
        assert!(manager.close(&uri("a.zs")).is_none());
        assert!(manager.get(&uri("a.zs")).is_none());
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_settings_reaches_every_session() {
        let manager = DocumentSessionManager::new();
        for name in ["a.zs", "b.zs"] {
            let session = manager.open(uri(name), String::new(), 0);
            session.set_settings(ZenScriptSettings::default()).await;
        }
        manager.clear_settings().await;
        for name in ["a.zs", "b.zs"] {
            let session = manager.get(&uri(name)).unwrap();
            assert!(session.settings().await.is_none());
        }
    }
}
