//! rmcp-backed sessions over TCP or a spawned tool-service process.

use super::session::{PendingSession, SessionError, SessionOpener, ToolSession};
use crate::error::{ConnectorError, ConnectorResult};
use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, CallToolResult, ReadResourceRequestParam, ResourceContents};
use rmcp::service::{Peer, RunningService, ServiceError, ServiceExt};
use rmcp::transport::TokioChildProcess;
use rmcp::RoleClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::process::Command;
use tokio::sync::Mutex;

/// Where the store tool service lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum McpEndpoint {
    /// `host:port` of a `wallaby-mcp --listen` server.
    Tcp(String),
    /// Spawn a server speaking MCP over stdio.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl McpEndpoint {
    /// Parse a shell-style command line such as `wallaby-mcp --stdio`.
    pub fn command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::Command {
            program,
            args: parts.collect(),
        })
    }
}

impl Default for McpEndpoint {
    fn default() -> Self {
        Self::Tcp("127.0.0.1:5001".to_string())
    }
}

impl fmt::Display for McpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
            Self::Command { program, args } if args.is_empty() => write!(f, "{program}"),
            Self::Command { program, args } => write!(f, "{program} {}", args.join(" ")),
        }
    }
}

pub struct McpOpener {
    endpoint: McpEndpoint,
}

impl McpOpener {
    pub fn new(endpoint: McpEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl SessionOpener for McpOpener {
    async fn open(&self) -> ConnectorResult<Box<dyn PendingSession>> {
        let transport = match &self.endpoint {
            McpEndpoint::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str()).await.map_err(|err| {
                    ConnectorError::Connection(format!("connect to tool service at {addr}: {err}"))
                })?;
                stream.set_nodelay(true).ok();
                Transport::Tcp(stream)
            }
            McpEndpoint::Command { program, args } => {
                let mut cmd = Command::new(program);
                cmd.args(args);
                let child = TokioChildProcess::new(cmd).map_err(|err| {
                    ConnectorError::Connection(format!("spawn tool service '{program}': {err}"))
                })?;
                Transport::Child(child)
            }
        };
        log::debug!("opened transport to {}", self.endpoint);
        Ok(Box::new(McpPending {
            transport: Some(transport),
        }))
    }
}

enum Transport {
    Tcp(TcpStream),
    Child(TokioChildProcess),
}

struct McpPending {
    transport: Option<Transport>,
}

#[async_trait]
impl PendingSession for McpPending {
    async fn handshake(&mut self) -> ConnectorResult<Arc<dyn ToolSession>> {
        let transport = self
            .transport
            .take()
            .ok_or_else(|| ConnectorError::Connection("handshake already attempted".to_string()))?;

        let service = match transport {
            Transport::Tcp(stream) => ().serve(stream).await.map_err(handshake_error)?,
            Transport::Child(child) => ().serve(child).await.map_err(handshake_error)?,
        };

        let tools = service.list_all_tools().await.map_err(|err| {
            ConnectorError::Connection(format!("list tools after handshake: {err}"))
        })?;
        let server = service
            .peer_info()
            .map(|info| info.server_info.name.clone())
            .unwrap_or_else(|| "unknown".to_string());
        log::info!("MCP session established with {server} ({} tools)", tools.len());

        Ok(Arc::new(McpSession::new(service)))
    }
}

fn handshake_error(err: impl fmt::Display) -> ConnectorError {
    ConnectorError::Connection(format!("MCP handshake failed: {err}"))
}

struct McpSession {
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ()>>>,
}

impl McpSession {
    fn new(service: RunningService<RoleClient, ()>) -> Self {
        Self {
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
        }
    }
}

fn classify(err: ServiceError) -> SessionError {
    match err {
        ServiceError::TransportClosed | ServiceError::TransportSend(_) => {
            SessionError::Closed(err.to_string())
        }
        ServiceError::McpError(data) => SessionError::Rejected(data.message.to_string()),
        other => SessionError::Rejected(other.to_string()),
    }
}

#[async_trait]
impl ToolSession for McpSession {
    async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
    ) -> Result<CallToolResult, SessionError> {
        self.peer
            .call_tool(CallToolRequestParam {
                name: name.to_string().into(),
                arguments: Some(arguments),
            })
            .await
            .map_err(classify)
    }

    async fn read_resource(&self, uri: &str) -> Result<String, SessionError> {
        let result = self
            .peer
            .read_resource(ReadResourceRequestParam {
                uri: uri.to_string(),
            })
            .await
            .map_err(classify)?;

        result
            .contents
            .into_iter()
            .find_map(|contents| match contents {
                ResourceContents::TextResourceContents { text, .. } => Some(text),
                _ => None,
            })
            .ok_or_else(|| SessionError::Rejected(format!("resource {uri} has no text contents")))
    }

    async fn close(&self) {
        if let Some(service) = self.service.lock().await.take() {
            if let Err(err) = service.cancel().await {
                log::debug!("MCP session shutdown: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn command_line_splits_program_and_args() {
        assert_eq!(
            McpEndpoint::command_line("wallaby-mcp --stdio --verbose"),
            Some(McpEndpoint::Command {
                program: "wallaby-mcp".to_string(),
                args: vec!["--stdio".to_string(), "--verbose".to_string()],
            })
        );
        assert_eq!(McpEndpoint::command_line("   "), None);
    }

    #[test]
    fn endpoint_display() {
        assert_eq!(McpEndpoint::default().to_string(), "tcp://127.0.0.1:5001");
        let cmd = McpEndpoint::command_line("wallaby-mcp --stdio").unwrap();
        assert_eq!(cmd.to_string(), "wallaby-mcp --stdio");
    }

    #[tokio::test]
    async fn unreachable_tcp_endpoint_is_a_connection_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let opener = McpOpener::new(McpEndpoint::Tcp(addr));
        match opener.open().await {
            Err(ConnectorError::Connection(reason)) => {
                assert!(reason.contains("connect to tool service"), "{reason}")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("connect to a closed port succeeded"),
        }
    }
}
