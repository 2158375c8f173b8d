use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::RwLock;

use tower_lsp::Client;
use tower_lsp::lsp_types::Url;

use tracing::{debug, info, warn};

use walkdir::WalkDir;

use crate::lsp::diagnostic_provider::{DiagnosticProvider, SyntaxDiagnosticProvider};
use crate::lsp::document::{DocumentSession, DocumentSnapshot};
use crate::lsp::features::completion::{BracketHandlerRegistry, CompletionProvider};
use crate::lsp::readiness::ReadinessGate;
use crate::lsp::sessions::DocumentSessionManager;
use crate::lsp::settings::{ClientSettingsProvider, ZenScriptSettings};

mod handlers;
mod state;

pub use state::ZenScriptBackend;

/// File extension of ZenScript sources.
pub const SCRIPT_EXTENSION: &str = "zs";

/// All `*.zs` files below `root`, sorted for a stable scan order.
pub fn collect_scripts(root: &Path) -> Vec<PathBuf> {
    let mut scripts: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable workspace entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == SCRIPT_EXTENSION))
        .map(|entry| entry.into_path())
        .collect();
    scripts.sort();
    scripts
}

impl ZenScriptBackend {
    /// Creates a backend answering completion from `registry`, reading settings
    /// from the client and reporting syntax diagnostics.
    pub fn new(client: Client, registry: Arc<BracketHandlerRegistry>) -> Self {
        let configuration_supported = Arc::new(AtomicBool::new(false));
        let settings_provider = Arc::new(ClientSettingsProvider::new(
            client.clone(),
            configuration_supported.clone(),
        ));
        let diagnostic_provider: Arc<dyn DiagnosticProvider> = Arc::new(SyntaxDiagnosticProvider);
        info!("Using {} backend for validation", diagnostic_provider.backend_name());

        Self {
            client,
            sessions: Arc::new(DocumentSessionManager::new()),
            readiness: ReadinessGate::new(),
            completion: Arc::new(CompletionProvider::new(registry)),
            diagnostic_provider,
            settings_provider,
            configuration_supported,
            root_dir: Arc::new(RwLock::new(None)),
        }
    }

    /// Parse every script under `root` into a session and publish its
    /// diagnostics. Documents already opened by the editor are left alone.
    async fn index_directory(&self, root: &Path) -> usize {
        let mut indexed = 0;
        for path in collect_scripts(root) {
            let Ok(uri) = Url::from_file_path(&path) else {
                warn!("Cannot build a URI for {}", path.display());
                continue;
            };
            if self.sessions.get(&uri).is_some() {
                continue;
            }
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(text) => text,
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };
            let session = self.sessions.open(uri, text, 0);
            let snapshot = session.snapshot().await;
            self.publish_diagnostics(&session, &snapshot).await;
            indexed += 1;
        }
        indexed
    }

    /// Initial workspace scan. Opens the readiness gate whatever the outcome.
    pub(super) async fn scan_workspace(&self) {
        let root = self.root_dir.read().await.clone();
        match root {
            Some(root) => {
                let count = self.index_directory(&root).await;
                info!("Parsed {} scripts under {}", count, root.display());
            }
            None => debug!("No workspace root, skipping initial scan"),
        }
        self.readiness.open();
    }

    pub(super) async fn publish_diagnostics(&self, session: &DocumentSession, snapshot: &DocumentSnapshot) {
        let diagnostics = self.diagnostic_provider.validate(snapshot).await;
        debug!(
            "Publishing {} diagnostics for {} v{}",
            diagnostics.len(),
            session.uri,
            snapshot.version
        );
        self.client
            .publish_diagnostics(session.uri.clone(), diagnostics, Some(snapshot.version))
            .await;
    }

    /// Cached settings of `session`, fetched from the provider on first use.
    pub(super) async fn settings_for(&self, session: &DocumentSession) -> ZenScriptSettings {
        if let Some(settings) = session.settings().await {
            return settings;
        }
        let settings = self.settings_provider.settings_for(&session.uri).await;
        session.set_settings(settings.clone()).await;
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use tower_lsp::LspService;

    use crate::lsp::features::completion::ItemCatalog;

    #[test]
    fn test_collect_scripts_finds_nested_zs_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("scripts/nested")).unwrap();
        fs::write(dir.path().join("scripts/a.zs"), "print(1);").unwrap();
        fs::write(dir.path().join("scripts/nested/b.zs"), "print(2);").unwrap();
        fs::write(dir.path().join("scripts/readme.md"), "# notes").unwrap();
        fs::create_dir_all(dir.path().join("scripts/dir.zs")).unwrap();

        let scripts = collect_scripts(dir.path());
        let names: Vec<_> = scripts
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["scripts/a.zs", "scripts/nested/b.zs"]);
    }

    #[tokio::test]
    async fn test_index_directory_parses_unopened_scripts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.zs"), "print(1);").unwrap();
        fs::write(dir.path().join("b.zs"), "val x = ;").unwrap();

        let (service, _socket) = LspService::new(|client| {
            let registry = BracketHandlerRegistry::with_defaults(Arc::new(ItemCatalog::default()));
            ZenScriptBackend::new(client, Arc::new(registry))
        });
        let backend = service.inner();

        assert_eq!(backend.index_directory(dir.path()).await, 2);
        let uri = Url::from_file_path(dir.path().join("b.zs")).unwrap();
        let snapshot = backend.sessions.get(&uri).unwrap().snapshot().await;
        assert_eq!(snapshot.version, 0);
        assert!(!snapshot.tree.is_well_formed());

        // Already tracked documents are skipped on a rescan.
        assert_eq!(backend.index_directory(dir.path()).await, 0);
    }
}
