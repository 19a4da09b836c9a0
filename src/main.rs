//! Greeting service binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ request id ─▶ trace ─▶ timeout ─▶ body limit
//!                                                         │
//!                                                         ▼
//!                                             ┌──────────────────────┐
//!                                             │ replay (optional)    │
//!                                             │  pass 1 ─┐           │
//!                                             │  pass 2 ─┤           │
//!                                             └──────────┼───────────┘
//!                                                        ▼
//!                                    route CORS layer ─▶ greeting handler
//!                                                        │
//!                                                        ▼
//!                                                identity registry
//! ```

use std::path::PathBuf;

use clap::Parser;

use greeting_cors::config::{load_config, ServiceConfig};
use greeting_cors::lifecycle::{self, Shutdown};
use greeting_cors::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "greeting-cors")]
#[command(about = "Greeting service with per-route CORS policies", long_about = None)]
struct Args {
    /// TOML configuration file; defaults are used when absent.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable the replay filter regardless of the config file.
    #[arg(long)]
    replay: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if args.replay {
        config.replay.enabled = true;
    }

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "greeting-cors starting");

    let shutdown = Shutdown::new();
    lifecycle::spawn_signal_handler(shutdown.clone());
    lifecycle::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
