//! Inventory-RPC client entry point.
//!
//! Connects to the server over the configured binding, then either runs a
//! single command given on the command line or starts the interactive menu.
//!
//! # Usage
//!
//! ```text
//! inventory-client [OPTIONS] [COMMAND]...
//!
//! Options:
//!   --port <PORT>   Server port (required)
//!   --host <HOST>   Server host [default: 127.0.0.1]
//!   --http          Use the HTTP-tunnelled binary binding
//!   --json          Use the JSON-RPC binding
//!   --timeout-secs <SECS>  Seconds to wait for each reply [default: 30]
//!
//! Examples:
//!   inventory-client --port 9000 show vegetable all
//!   inventory-client --port 9000 --json
//! ```
//!
//! The binding flags must match the server's.  Environment variables
//! `INVENTORY_PORT`, `INVENTORY_HOST`, `INVENTORY_USE_HTTP`,
//! `INVENTORY_USE_JSON` and `INVENTORY_TIMEOUT_SECS` stand in for the flags.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ TransportConfig::resolve()  -- port + binding flags
//!  └─ connect()                   -- TCP (+ CONNECT handshake) → RpcClient
//!  └─ Dispatcher                  -- Command → RpcClient::call → render
//!       ├─ one-shot: trailing COMMAND tokens
//!       └─ run_menu(): terminal until exit/quit/EOF
//! ```

use std::io::Write;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use inventory_client::infrastructure::network::DEFAULT_HOST;
use inventory_client::{connect, Dispatcher, DEFAULT_REPLY_TIMEOUT};
use inventory_core::console::{parse_line, run_menu, spawn_terminal_lines, CommandSink, MenuInput, HELP};
use inventory_core::{Binding, TransportConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inventory-RPC client.
#[derive(Debug, Parser)]
#[command(
    name = "inventory-client",
    about = "Queries and updates a remote vegetable inventory",
    version
)]
struct Cli {
    /// Server port.
    #[arg(long, env = "INVENTORY_PORT")]
    port: Option<u16>,

    /// Server host name or IP address.
    #[arg(long, default_value = DEFAULT_HOST, env = "INVENTORY_HOST")]
    host: String,

    /// Use the HTTP-tunnelled binary binding.
    #[arg(long, env = "INVENTORY_USE_HTTP")]
    http: bool,

    /// Use the JSON-RPC binding.
    #[arg(long, env = "INVENTORY_USE_JSON")]
    json: bool,

    /// Seconds to wait for each reply before giving up on the server.
    #[arg(long, env = "INVENTORY_TIMEOUT_SECS", default_value_t = DEFAULT_REPLY_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// A single command to run instead of the menu, e.g. `show vegetable all`.
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

impl Cli {
    /// Validates the port and binding flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the port is missing or zero, or both binding
    /// flags are set.
    fn binding(&self) -> anyhow::Result<Binding> {
        let config = TransportConfig {
            port: self.port,
            use_http: self.http,
            use_json: self.json,
        };
        config.resolve().context("invalid client configuration")
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with tables on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let binding = cli.binding()?;

    let reply_timeout = Duration::from_secs(cli.timeout_secs);
    let client = connect(binding, &cli.host, reply_timeout)
        .await
        .with_context(|| format!("cannot reach inventory server ({})", binding.transport))?;
    let mut dispatcher = Dispatcher::new(client);
    let mut stdout = std::io::stdout();

    if !cli.command.is_empty() {
        return run_once(&mut dispatcher, &cli.command.join(" "), &mut stdout).await;
    }

    let mut lines = spawn_terminal_lines();
    let exit = run_menu(&mut lines, &mut stdout, &mut dispatcher)
        .await
        .context("inventory call failed")?;
    info!("client menu closed ({exit:?})");
    Ok(())
}

/// Runs one command line through `sink` and prints the result.
async fn run_once<S, W>(sink: &mut S, line: &str, out: &mut W) -> anyhow::Result<()>
where
    S: CommandSink,
    W: Write,
{
    match parse_line(line) {
        MenuInput::Command { verb, args } => {
            let text = sink
                .execute(verb, &args)
                .await
                .map_err(anyhow::Error::msg)
                .context("inventory call failed")?;
            out.write_all(text.as_bytes())?;
        }
        MenuInput::Help => out.write_all(HELP.as_bytes())?,
        MenuInput::Blank | MenuInput::Exit => {}
        MenuInput::Unknown(word) => bail!("Unknown command: {word}"),
    }
    out.flush()?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
