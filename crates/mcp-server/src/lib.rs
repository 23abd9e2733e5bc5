//! Wallaby tool service
//!
//! Exposes the store catalog's lookups as MCP tools plus two read-only
//! resources (`product_catalog`, `store_map_layout`).
//!
//! ## Transports
//!
//! - TCP: one MCP session per accepted connection ([`serve_tcp`])
//! - stdio: a single session on stdin/stdout ([`serve_stdio`]), for clients
//!   that spawn the service as a child process

use anyhow::{Context, Result};
use rmcp::ServiceExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;

mod tools;

pub use tools::StoreService;

/// Serve one MCP session over an arbitrary byte stream until the peer leaves.
pub async fn serve_stream<S>(service: StoreService, stream: S) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let running = service
        .serve(stream)
        .await
        .context("MCP session initialization failed")?;
    let reason = running.waiting().await.context("MCP session task failed")?;
    log::debug!("MCP session closed: {reason:?}");
    Ok(())
}

/// Accept TCP connections forever, serving each on its own task.
pub async fn serve_tcp(listener: TcpListener, service: StoreService) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        log::info!("MCP client connected from {peer}");
        let service = service.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_stream(service, stream).await {
                log::warn!("MCP session with {peer} ended with error: {err:#}");
            } else {
                log::info!("MCP client {peer} disconnected");
            }
        });
    }
}

/// Serve a single session on stdin/stdout.
pub async fn serve_stdio(service: StoreService) -> Result<()> {
    let running = service
        .serve(rmcp::transport::stdio())
        .await
        .context("MCP stdio initialization failed")?;
    running.waiting().await?;
    Ok(())
}
