//! Seams between the connector and a concrete MCP session.
//!
//! Opening a transport and performing the protocol handshake are separate
//! steps so each can be bounded by its own timeout.

use crate::error::ConnectorResult;
use async_trait::async_trait;
use rmcp::model::CallToolResult;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

/// Failure of a single request on an established session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The underlying stream is gone; the session cannot be reused.
    #[error("{0}")]
    Closed(String),

    /// The server answered with a protocol-level error.
    #[error("{0}")]
    Rejected(String),
}

#[async_trait]
pub trait SessionOpener: Send + Sync {
    /// Open the transport to the tool service (TCP connect, process spawn).
    async fn open(&self) -> ConnectorResult<Box<dyn PendingSession>>;
}

#[async_trait]
pub trait PendingSession: Send {
    /// Run the initialize exchange and capability listing.
    ///
    /// Dropping the pending session (or the returned future) releases the transport.
    async fn handshake(&mut self) -> ConnectorResult<Arc<dyn ToolSession>>;
}

#[async_trait]
pub trait ToolSession: Send + Sync {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, SessionError>;

    /// Read a resource and return its text body.
    async fn read_resource(&self, uri: &str) -> Result<String, SessionError>;

    async fn close(&self);
}
