//! Wallaby shopping assistant.
//!
//! A [`ShoppingAgent`] answers chat messages by letting a [`ReasoningModel`]
//! pick store operations, which the [`Connector`] runs against the
//! `wallaby-mcp` tool service.

pub mod agent;
pub mod config;
pub mod connector;
pub mod error;
pub mod http_api;
pub mod model;

pub use agent::{ChatReply, ShoppingAgent};
pub use config::AssistantConfig;
pub use connector::{ConnectionState, Connector, ConnectorSettings, McpEndpoint, McpOpener};
pub use error::{AgentError, ConnectorError};
pub use model::{Decision, OllamaModel, Operation, ReasoningModel, Step};
