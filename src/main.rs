use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use vault_replace::app::{self, events::UserEvent, state::AppState};
use vault_replace::core::{DocumentStore, FsVault};

/// Runs the engine as a line-oriented IPC peer.
///
/// Each stdin line is one JSON `IpcMessage`; each event is written to stdout
/// as one JSON line. Logs go to stderr.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let state = AppState::default();
    let root = match std::env::args_os().nth(1) {
        Some(arg) => std::path::PathBuf::from(arg),
        None => match state.config.vault_directory.clone() {
            Some(dir) => dir,
            None => std::env::current_dir().context("Failed to read the current directory")?,
        },
    };
    let root = Utf8PathBuf::try_from(root).context("Vault path is not valid UTF-8")?;
    let vault = FsVault::new(root)
        .with_ignore_patterns(state.config.ignore_patterns.clone())
        .with_markdown_extensions(state.config.markdown_extensions.clone());
    tracing::info!("Using vault at {}", vault.root());

    let store: Arc<dyn DocumentStore> = Arc::new(vault);
    let state = Arc::new(Mutex::new(state));

    let (proxy, events) = mpsc::unbounded_channel::<UserEvent>();
    let printer = tokio::spawn(app::write_events(events, tokio::io::stdout()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        app::handle_ipc_message(line, store.clone(), proxy.clone(), state.clone());
    }

    tracing::info!("Input closed. Waiting for the running replacement to finish...");
    let running = state
        .lock()
        .expect("Mutex was poisoned. This should not happen.")
        .replace_task
        .take();
    if let Some(handle) = running {
        if let Err(e) = handle.await {
            tracing::error!("Replacement task failed: {}", e);
        }
    }

    drop(proxy);
    printer.await?;
    Ok(())
}
