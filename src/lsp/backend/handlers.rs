//! LSP protocol handler implementations
//!
//! This module contains the `tower_lsp::LanguageServer` implementation for
//! the ZenScript backend:
//! - Lifecycle handlers (initialize, initialized, shutdown)
//! - Document lifecycle (did_open, did_change, did_close)
//! - Configuration changes
//! - Completion, completion resolve and hover

use std::sync::atomic::Ordering;

use tower_lsp::{LanguageServer, jsonrpc};
use tower_lsp::lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse,
    DidChangeConfigurationParams, DidChangeTextDocumentParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, Hover, HoverParams, HoverProviderCapability, InitializeParams,
    InitializeResult, InitializedParams, Registration, ServerCapabilities, ServerInfo,
    TextDocumentSyncCapability, TextDocumentSyncKind,
};
use tower_lsp::jsonrpc::Result as LspResult;

use tracing::{debug, info, warn};

use crate::lsp::features::hover::TokenHover;

use super::state::ZenScriptBackend;

const TRIGGER_CHARACTERS: [&str; 5] = ["#", ".", ":", "<", " "];

#[tower_lsp::async_trait]
impl LanguageServer for ZenScriptBackend {
    /// Handles the LSP initialize request, recording client capabilities and the workspace root.
    async fn initialize(&self, params: InitializeParams) -> jsonrpc::Result<InitializeResult> {
        info!("Received initialize from {:?}", params.client_info.as_ref().map(|c| &c.name));

        let configuration = params
            .capabilities
            .workspace
            .as_ref()
            .and_then(|w| w.configuration)
            .unwrap_or(false);
        self.configuration_supported.store(configuration, Ordering::Release);

        #[allow(deprecated)]
        let root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .map(|folder| folder.uri.clone())
            .or(params.root_uri);
        if let Some(root_uri) = root {
            match root_uri.to_file_path() {
                Ok(path) => *self.root_dir.write().await = Some(path),
                Err(()) => warn!("Workspace root {} is not a file path, skipping scan", root_uri),
            }
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(true),
                    trigger_characters: Some(TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect()),
                    ..Default::default()
                }),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    /// Registers for configuration changes, then parses the workspace and opens the readiness gate.
    async fn initialized(&self, _params: InitializedParams) {
        info!("Client initialized");

        if self.configuration_supported.load(Ordering::Acquire) {
            let registration = Registration {
                id: "zenscript-configuration".to_string(),
                method: "workspace/didChangeConfiguration".to_string(),
                register_options: None,
            };
            if let Err(e) = self.client.register_capability(vec![registration]).await {
                warn!("Failed to register for configuration changes: {}", e);
            }
        }

        self.scan_workspace().await;
    }

    async fn shutdown(&self) -> jsonrpc::Result<()> {
        info!("Received shutdown request");
        Ok(())
    }

    /// Handles opening a text document, parsing and validating it.
    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        info!("Opening document: URI={}, version={}", params.text_document.uri, params.text_document.version);
        let session = self.sessions.open(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        );
        let snapshot = session.snapshot().await;
        self.publish_diagnostics(&session, &snapshot).await;
    }

    /// Handles full-text changes: reparse, then republish diagnostics.
    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        debug!("Changing document: URI={}, version={}", uri, version);

        let Some(session) = self.sessions.get(&uri) else {
            warn!("Change for unknown document {}", uri);
            return;
        };
        if let Some(snapshot) = session.apply(params.content_changes, version).await {
            self.publish_diagnostics(&session, &snapshot).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        info!("Closing document: URI={}", uri);
        if self.sessions.close(&uri).is_some() {
            self.client.publish_diagnostics(uri, Vec::new(), None).await;
        }
    }

    async fn did_change_configuration(&self, _params: DidChangeConfigurationParams) {
        debug!("Configuration changed, dropping cached settings");
        self.sessions.clear_settings().await;
    }

    /// Waits for the workspace scan, resolves intent at the cursor and lists matching items.
    async fn completion(&self, params: CompletionParams) -> LspResult<Option<CompletionResponse>> {
        self.readiness.wait().await;

        let uri = params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;
        let Some(session) = self.sessions.get(&uri) else {
            debug!("Completion for unknown document {}", uri);
            return Ok(None);
        };

        let snapshot = session.snapshot().await;
        let settings = self.settings_for(&session).await;
        let offset = snapshot.offset_at(&position);
        let trigger = params
            .context
            .as_ref()
            .and_then(|context| context.trigger_character.as_deref());

        let (_, items) = self.completion.complete(&snapshot, offset, trigger, &settings);
        Ok(Some(CompletionResponse::Array(items)))
    }

    async fn completion_resolve(&self, item: CompletionItem) -> LspResult<CompletionItem> {
        Ok(self.completion.resolve(item))
    }

    async fn hover(&self, params: HoverParams) -> LspResult<Option<Hover>> {
        let uri = params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;
        let Some(session) = self.sessions.get(&uri) else {
            return Ok(None);
        };
        let snapshot = session.snapshot().await;
        Ok(TokenHover.hover(&snapshot, position))
    }
}
