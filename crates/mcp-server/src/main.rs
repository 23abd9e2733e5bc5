//! Wallaby MCP Server
//!
//! Serves the store catalog tools over MCP.
//!
//! ## Usage
//!
//! ```text
//! wallaby-mcp --listen 127.0.0.1:5001   # TCP, one session per connection
//! wallaby-mcp --stdio                   # single session on stdin/stdout
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use wallaby_mcp::{serve_stdio, serve_tcp, StoreService};

const DEFAULT_LISTEN: &str = "127.0.0.1:5001";

#[derive(Parser)]
#[command(name = "wallaby-mcp")]
#[command(about = "MCP tool service for the Wallaby store assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// TCP address to listen on (overrides WALLABY_MCP_LISTEN)
    #[arg(long)]
    listen: Option<String>,

    /// Serve a single session on stdin/stdout instead of TCP
    #[arg(long, conflicts_with = "listen")]
    stdio: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol in stdio mode; logs always go to stderr
    let default_filter = if cli.stdio { "warn" } else { "info" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let service = StoreService::builtin();
    log::info!(
        "Starting Wallaby MCP server for {} ({} products)",
        service.catalog().store_name(),
        service.catalog().entries().len()
    );

    if cli.stdio {
        serve_stdio(service).await?;
        log::info!("Wallaby MCP server stopped");
        return Ok(());
    }

    let listen = cli
        .listen
        .or_else(|| env::var("WALLABY_MCP_LISTEN").ok())
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Failed to bind {listen}"))?;
    log::info!("Listening for MCP clients on {}", listener.local_addr()?);

    tokio::select! {
        result = serve_tcp(listener, service) => result?,
        _ = tokio::signal::ctrl_c() => log::info!("Shutdown requested"),
    }

    log::info!("Wallaby MCP server stopped");
    Ok(())
}
