use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::{debug, info};

use zenscript_language_server::logging::init_logger;
use zenscript_language_server::lsp::backend::ZenScriptBackend;
use zenscript_language_server::lsp::features::completion::{BracketHandlerRegistry, ItemCatalog};

/// ZenScript language server, speaking LSP over stdio.
#[derive(Debug, Parser)]
#[command(name = "zenscript-language-server", version, about)]
struct Args {
    /// Log filter for stderr (overrides RUST_LOG), e.g. "debug" or "zenscript_language_server=trace"
    #[arg(long)]
    log_level: Option<String>,

    /// Disable ANSI colors in stderr output
    #[arg(long)]
    no_color: bool,

    /// Do not write a session log to the cache directory
    #[arg(long)]
    no_file_logging: bool,

    /// JSON item catalog used for `<item:...>` completion
    #[arg(long, value_name = "PATH")]
    item_catalog: Option<PathBuf>,

    /// Serve over stdio (the only transport; accepted for editor compatibility)
    #[arg(long)]
    stdio: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let _guard = init_logger(args.no_color, args.log_level.as_deref(), !args.no_file_logging)
        .context("Failed to initialize logging")?;

    info!(
        "Starting {} {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let catalog = match &args.item_catalog {
        Some(path) => ItemCatalog::load(path)
            .with_context(|| format!("Failed to load item catalog {}", path.display()))?,
        None => ItemCatalog::default(),
    };
    let registry = Arc::new(BracketHandlerRegistry::with_defaults(Arc::new(catalog)));

    if !args.stdio {
        debug!("--stdio not given, serving over stdio anyway");
    }
    let (service, socket) = LspService::new(|client| ZenScriptBackend::new(client, registry));
    Server::new(tokio::io::stdin(), tokio::io::stdout(), socket)
        .serve(service)
        .await;

    info!("Server stopped");
    Ok(())
}
