use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use wallaby_assistant::config::{AssistantConfig, Overrides};
use wallaby_assistant::http_api::{self, AppState};
use wallaby_assistant::{Connector, ConnectorSettings, McpOpener, OllamaModel, ShoppingAgent};

#[derive(Parser, Debug)]
#[command(name = "wallaby", version, about = "Wallaby shopping assistant HTTP API")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address for the HTTP API (default 127.0.0.1:8000)
    #[arg(long)]
    bind: Option<String>,

    /// Address of a `wallaby-mcp --listen` tool service
    #[arg(long, conflicts_with = "mcp_command")]
    mcp_addr: Option<String>,

    /// Command that starts a stdio tool service, e.g. "wallaby-mcp --stdio"
    #[arg(long)]
    mcp_command: Option<String>,

    /// Base URL of the Ollama server
    #[arg(long)]
    ollama_url: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            bind: self.bind.clone(),
            mcp_addr: self.mcp_addr.clone(),
            mcp_command: self.mcp_command.clone(),
            ollama_url: self.ollama_url.clone(),
            model: self.model.clone(),
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(log::LevelFilter::Warn);
    }
    builder.target(env_logger::Target::Stderr).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::error!("failed to listen for Ctrl+C: {err}");
        std::future::pending::<()>().await;
    }
    log::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = AssistantConfig::resolve(cli.config.as_deref(), cli.overrides(), &|name: &str| {
        std::env::var(name).ok()
    })?;

    log::info!("tool service endpoint: {}", config.mcp.endpoint);
    let connector = Arc::new(Connector::new(
        Arc::new(McpOpener::new(config.mcp.endpoint.clone())),
        ConnectorSettings::from(&config.mcp),
    ));
    connector
        .connect_with_retries(
            config.mcp.connect_attempts,
            Duration::from_millis(config.mcp.backoff_base_ms),
        )
        .await
        .context("could not reach the store tool service")?;

    let model = OllamaModel::new(&config.model)?;
    log::info!("reasoning model: {} at {}", config.model.model, config.model.base_url);
    let agent = Arc::new(ShoppingAgent::new(
        Arc::clone(&connector),
        Arc::new(model),
        config.model.max_iterations,
    ));

    let listener = TcpListener::bind(&config.http.bind)
        .await
        .with_context(|| format!("bind HTTP API on {}", config.http.bind))?;
    log::info!("Wallaby API listening on http://{}", listener.local_addr()?);

    let served = axum::serve(listener, http_api::router(AppState::ready(agent)))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    connector.disconnect().await;
    served.context("HTTP server failed")
}
