//! Blender MCP Server Binary
//!
//! Runs the Blender MCP server on stdio transport, allowing AI agents to build
//! and render Blender scenes through validated tools.
//!
//! ## Usage
//!
//! Run directly:
//! ```bash
//! blender-mcp --backend memory
//! ```
//!
//! Or add to an MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "blender": {
//!       "command": "blender-mcp",
//!       "args": ["--document", "/path/to/scene.blend"]
//!     }
//!   }
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use blender_mcp::config::{Backend, CONFIG_ENV, ServerConfig};
use blender_mcp::lifecycle::{StopOutcome, Worker};
use blender_mcp::state::HostHandle;
use blender_mcp::{BlenderMcpService, serve_stdio};

#[derive(Parser)]
#[command(name = "blender-mcp")]
#[command(about = "MCP server exposing Blender scene operations over stdio", long_about = None)]
#[command(version)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    /// Scene host backend: memory or detached
    #[arg(long)]
    backend: Option<Backend>,

    /// .blend document to open before serving
    #[arg(long)]
    document: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "blender_mcp=trace")
    #[arg(long)]
    log_filter: Option<String>,
}

impl Cli {
    fn resolve(self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load(self.config.as_deref())?;
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(document) = self.document {
            config.document = Some(document);
        }
        if let Some(filter) = self.log_filter {
            config.log_filter = filter;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().resolve()?;

    // CRITICAL: Log to stderr only - stdout is reserved for MCP JSON-RPC
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("Invalid log filter")?;

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = %config.backend,
        "Blender MCP server starting"
    );

    let backend = config.backend;
    let host = HostHandle::spawn(move || backend.create_host())?;

    if let Some(document) = &config.document {
        let outcome = host
            .invoke("open_file", json!({ "filepath": document.display().to_string() }))
            .await?;
        match outcome {
            Some(outcome) if outcome.is_success() => {
                tracing::info!(path = %document.display(), "Startup document loaded");
            }
            Some(outcome) => {
                tracing::warn!(message = %outcome.into_message(), "Startup document not loaded");
            }
            None => {}
        }
    }

    let service = BlenderMcpService::new(host);
    let worker = Worker::new(config.shutdown_grace());
    worker.start(move |stop| serve_stdio(service, stop));

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to listen for interrupt");
            } else {
                tracing::info!("Interrupt received");
            }
        }
        () = worker.finished() => {}
    }

    match worker.stop().await {
        StopOutcome::Unresponsive => tracing::warn!("MCP session did not shut down cleanly"),
        StopOutcome::Stopped | StopOutcome::NotRunning => {}
    }

    tracing::info!("Shutting down.");
    Ok(())
}
