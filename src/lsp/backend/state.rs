//! Backend state management
//!
//! This module defines the ZenScriptBackend struct, which holds all state of
//! the server: document sessions, the readiness gate, the completion provider
//! and the diagnostic provider.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio::sync::RwLock;
use tower_lsp::Client;

use crate::lsp::diagnostic_provider::DiagnosticProvider;
use crate::lsp::features::completion::CompletionProvider;
use crate::lsp::readiness::ReadinessGate;
use crate::lsp::sessions::DocumentSessionManager;
use crate::lsp::settings::SettingsProvider;

/// The ZenScript language server backend, managing state and handling LSP requests.
#[derive(Clone)]
pub struct ZenScriptBackend {
    pub(super) client: Client,
    pub(super) sessions: Arc<DocumentSessionManager>,
    /// Opened once the initial workspace scan has parsed every script
    pub(super) readiness: ReadinessGate,
    pub(super) completion: Arc<CompletionProvider>,
    /// Pluggable diagnostic provider
    pub(super) diagnostic_provider: Arc<dyn DiagnosticProvider>,
    pub(super) settings_provider: Arc<dyn SettingsProvider>,
    /// Set during `initialize` when the client answers `workspace/configuration`
    pub(super) configuration_supported: Arc<AtomicBool>,
    pub(super) root_dir: Arc<RwLock<Option<PathBuf>>>,
}

// Manual Debug implementation since the providers don't implement Debug
impl std::fmt::Debug for ZenScriptBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZenScriptBackend")
            .field("backend", &self.diagnostic_provider.backend_name())
            .field("documents_count", &self.sessions.len())
            .field("ready", &self.readiness.is_open())
            .finish()
    }
}
