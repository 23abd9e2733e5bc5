use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the connector to the store tool service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectorError {
    #[error("{0}")]
    Connection(String),

    /// A broken stream was detected and the single reconnect attempt failed too.
    #[error("{original}; reconnect failed: {reconnect}")]
    ReconnectFailed { original: String, reconnect: String },

    #[error("{operation} timed out after {after:?}")]
    Timeout { operation: String, after: Duration },

    #[error("tool error: {0}")]
    Tool(String),

    #[error("could not decode tool output: {0}")]
    Decode(String),
}

impl ConnectorError {
    pub fn not_connected() -> Self {
        Self::Connection("Not connected to server".to_string())
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// Operation input the agent could not turn into tool arguments.
    #[error("{0}")]
    Parse(String),

    #[error("reasoning model failed: {0}")]
    Model(String),

    #[error(transparent)]
    Connector(#[from] ConnectorError),
}

pub type ConnectorResult<T> = std::result::Result<T, ConnectorError>;
