//! Blender MCP Filter Binary
//!
//! ## Usage
//!
//! ```bash
//! blender-mcp-filter --background --script mcp_server.py
//! blender-mcp-filter -- python3 -u mcp_server.py
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use blender_mcp_filter::{FilterConfig, exit_code, run};

#[tokio::main]
async fn main() -> Result<()> {
    let config = FilterConfig::parse();

    // stdout carries the filtered stream, logs go to stderr
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    let command = config.command()?;
    let status = run(
        command,
        config.settings(),
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await?;

    std::process::exit(exit_code(status));
}
