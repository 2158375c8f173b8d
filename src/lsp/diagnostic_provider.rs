//! Diagnostic provider abstraction
//!
//! The backend publishes whatever the configured provider reports for a
//! snapshot. The only provider today turns recovered syntax errors into
//! diagnostics.

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString, Range};

use crate::lsp::document::DocumentSnapshot;
use crate::parsers::zenscript::{SyntaxError, SyntaxErrorKind};

pub const DIAGNOSTIC_SOURCE: &str = "zenscript";

/// Common interface for validation backends
#[async_trait::async_trait]
pub trait DiagnosticProvider: Send + Sync {
    /// Diagnostics for one snapshot; an empty vec for a valid document.
    async fn validate(&self, snapshot: &DocumentSnapshot) -> Vec<Diagnostic>;

    /// Get a human-readable name for this backend (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}

/// Reports lexer and parser errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxDiagnosticProvider;

impl SyntaxDiagnosticProvider {
    pub fn to_diagnostic(snapshot: &DocumentSnapshot, error: &SyntaxError) -> Diagnostic {
        let code = match error.kind {
            SyntaxErrorKind::MissingToken => "missing-token",
            SyntaxErrorKind::UnexpectedToken => "unexpected-token",
            SyntaxErrorKind::UnexpectedEof => "unexpected-eof",
            SyntaxErrorKind::Misplaced => "misplaced",
            SyntaxErrorKind::NestingLimit => "nesting-limit",
        };
        Diagnostic {
            range: Range::new(
                snapshot.position_at(error.span.start),
                snapshot.position_at(error.span.end),
            ),
            severity: Some(DiagnosticSeverity::ERROR),
            code: Some(NumberOrString::String(code.to_string())),
            source: Some(DIAGNOSTIC_SOURCE.to_string()),
            message: error.message.clone(),
            ..Default::default()
        }
    }
}

#[async_trait::async_trait]
impl DiagnosticProvider for SyntaxDiagnosticProvider {
    async fn validate(&self, snapshot: &DocumentSnapshot) -> Vec<Diagnostic> {
        snapshot
            .tree
            .errors
            .iter()
            .map(|error| Self::to_diagnostic(snapshot, error))
            .collect()
    }

    fn backend_name(&self) -> &'static str {
        "syntax"
    }
}
