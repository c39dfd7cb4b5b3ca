//! Invocation Gateway
//!
//! Exposes a request/response function behind plain HTTP.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────────┐
//!                     │                  INVOCATION GATEWAY                    │
//!   Client Request    │  ┌────────┐   ┌─────────────┐   ┌──────────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│   adapter   │──▶│     backend      │──┼──▶ Function
//!                     │  │ server │   │  translate  │   │  invoke endpoint │  │
//!                     │  └────────┘   │   invoker   │   └──────────────────┘  │
//!                     │               │  deadline   │                          │
//!   Client Response   │  ┌────────┐   │ commitment  │                          │
//!   ◀─────────────────┼──│response│◀──└─────────────┘                          │
//!                     │  │ writer │                                            │
//!                     │  └────────┘                                            │
//!                     │  ┌────────────────────────────────────────────────┐   │
//!                     │  │ config │ health probes │ observability │ lifecycle│  │
//!                     │  └────────────────────────────────────────────────┘   │
//!                     └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use invocation_gateway::config::load_config;
use invocation_gateway::lifecycle::startup;
use invocation_gateway::observability::logging;
use invocation_gateway::Shutdown;

#[derive(Parser)]
#[command(name = "invocation-gateway")]
#[command(about = "HTTP front end for an invocation-style function", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!("invocation-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        timeout_ms = config.timeouts.invocation_ms,
        invoke_url = %config.backend.invoke_url,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    startup::start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
