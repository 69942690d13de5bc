//! Preview propagation demo server.
//!
//! ```text
//!   client ── X-PREVIEW: v ──▶ PreviewLayer ──▶ handler ──▶ PreviewClient ── X-PREVIEW: v ──▶ upstream
//!                               (capture into             (inject from
//!                                extensions)               extensions)
//! ```
//!
//! Endpoints:
//! - `GET /echo`: the `X-PREVIEW` header as received
//! - `GET /marker`: the marker captured into the request context
//! - `ANY /forward/*`: forwarded to `upstream.base_url` with the marker

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use preview_propagation::config::{resolve_config, ConfigOverrides};
use preview_propagation::observability::logging;
use preview_propagation::HttpServer;

#[derive(Parser)]
#[command(name = "preview-propagation")]
#[command(about = "Propagates the X-PREVIEW header from inbound to outbound requests", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the upstream base URL used by /forward.
    #[arg(short, long)]
    upstream: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = resolve_config(
        cli.config.as_deref(),
        ConfigOverrides {
            bind_address: cli.bind,
            upstream: cli.upstream,
        },
    )?;

    logging::init(&config.observability);

    tracing::info!("preview-propagation v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = ?config.upstream.base_url,
        request_timeout_secs = config.listener.request_timeout_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
