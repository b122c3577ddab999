//! Inventory-RPC server entry point.
//!
//! Loads the snapshot, binds the configured binding and serves it while the
//! interactive menu runs on the terminal.  Leaving the menu (or Ctrl+C)
//! stops the accept loop and releases the port.
//!
//! # Usage
//!
//! ```text
//! inventory-server [OPTIONS]
//!
//! Options:
//!   --port <PORT>         Listening port (required)
//!   --bind <ADDR>         Address to bind [default: 0.0.0.0]
//!   --http                Binary frames behind an HTTP CONNECT handshake
//!   --json                Newline-delimited JSON-RPC
//!   --delay-ms <MS>       Artificial latency per operation [default: 0]
//!   --db <PATH>           Snapshot file [default: inventory.toml]
//!   --config <PATH>       TOML file with a [server] table
//!   --no-menu             Serve until Ctrl+C without the terminal menu
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable             | Flag         |
//! |----------------------|--------------|
//! | `INVENTORY_PORT`     | `--port`     |
//! | `INVENTORY_BIND`     | `--bind`     |
//! | `INVENTORY_USE_HTTP` | `--http`     |
//! | `INVENTORY_USE_JSON` | `--json`     |
//! | `INVENTORY_DELAY_MS` | `--delay-ms` |
//! | `INVENTORY_DB`       | `--db`       |
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ ServerSettings::resolve()   -- CLI over config file over defaults
//!  └─ RecordStore::open()         -- loads the TOML snapshot
//!  └─ serve()                     -- Tokio task, one task per connection
//!  └─ run_menu()                  -- terminal, until exit/quit/EOF
//! ```

use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use inventory_core::console::{run_menu, spawn_terminal_lines};
use inventory_server::infrastructure::console::ServerConsole;
use inventory_server::infrastructure::storage::config::{
    load_file_config, FileConfig, ServerSection, ServerSettings,
};
use inventory_server::{serve, InventoryService, RecordStore, SnapshotFile};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inventory-RPC server.
#[derive(Debug, Parser)]
#[command(
    name = "inventory-server",
    about = "Serves a vegetable inventory over binary, HTTP-tunnelled or JSON RPC",
    version
)]
struct Cli {
    /// TCP port to listen on.
    #[arg(long, env = "INVENTORY_PORT")]
    port: Option<u16>,

    /// IP address to bind to.
    #[arg(long, env = "INVENTORY_BIND")]
    bind: Option<String>,

    /// Expect an HTTP CONNECT handshake before binary frames.
    #[arg(long, env = "INVENTORY_USE_HTTP")]
    http: bool,

    /// Speak newline-delimited JSON-RPC.
    #[arg(long, env = "INVENTORY_USE_JSON")]
    json: bool,

    /// Artificial delay applied to every operation, in milliseconds.
    #[arg(long, env = "INVENTORY_DELAY_MS")]
    delay_ms: Option<u64>,

    /// Path of the TOML inventory snapshot.
    #[arg(long, env = "INVENTORY_DB")]
    db: Option<PathBuf>,

    /// TOML file with a `[server]` table; flags override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without the terminal menu; stop with Ctrl+C.
    #[arg(long)]
    no_menu: bool,
}

impl Cli {
    /// The settings given on the command line, unset ones left as `None`.
    fn section(&self) -> ServerSection {
        ServerSection {
            port: self.port,
            bind_address: self.bind.clone(),
            // A flag that is off leaves the file's choice alone.
            use_http: self.http.then_some(true),
            use_json: self.json.then_some(true),
            delay_ms: self.delay_ms,
            db_path: self.db.clone(),
        }
    }

    /// Merges the command line over the optional config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or the merged
    /// settings are invalid.
    fn into_settings(self) -> anyhow::Result<ServerSettings> {
        let file = match &self.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        let settings = ServerSettings::resolve(self.section().or(file.server))
            .context("invalid server configuration")?;
        Ok(settings)
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let with_menu = !cli.no_menu;
    let settings = cli.into_settings()?;

    info!(
        "Inventory-RPC server starting: {} on {}, snapshot {}",
        settings.binding.transport,
        settings.listen_addr(),
        settings.db_path.display()
    );

    let store = RecordStore::open(Box::new(SnapshotFile::new(settings.db_path.clone())));
    let service = Arc::new(InventoryService::new(store, settings.delay));

    // Bind before the menu starts so a port clash is reported immediately.
    let addr = settings.listen_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {} listener on {addr}", settings.binding.transport))?;

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C; shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => error!("failed to listen for Ctrl+C signal: {e}"),
        }
    });

    let server = tokio::spawn(serve(
        listener,
        settings.binding.transport,
        Arc::clone(&service),
        Arc::clone(&running),
    ));

    if with_menu {
        let mut lines = spawn_terminal_lines();
        let mut console = ServerConsole::new(Arc::clone(&service));
        let mut stdout = std::io::stdout();
        tokio::select! {
            result = run_menu(&mut lines, &mut stdout, &mut console) => {
                if let Err(e) = result {
                    error!("menu stopped: {e}");
                }
            }
            _ = wait_for_shutdown(&running) => {}
        }
        running.store(false, Ordering::Relaxed);
    }

    server.await.context("accept loop panicked")?;
    info!("Inventory-RPC server stopped");
    Ok(())
}

/// Resolves once `running` has been cleared.
async fn wait_for_shutdown(running: &AtomicBool) {
    while running.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
