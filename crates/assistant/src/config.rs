//! Assistant configuration.
//!
//! Values resolve as: command-line flag, then `WALLABY_*` environment
//! variable, then the TOML file, then built-in defaults.

use crate::agent::DEFAULT_MAX_ITERATIONS;
use crate::connector::McpEndpoint;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_BIND: &str = "WALLABY_BIND";
pub const ENV_MCP_ADDR: &str = "WALLABY_MCP_ADDR";
pub const ENV_MCP_COMMAND: &str = "WALLABY_MCP_COMMAND";
pub const ENV_OLLAMA_URL: &str = "WALLABY_OLLAMA_URL";
pub const ENV_MODEL: &str = "WALLABY_MODEL";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    pub http: HttpConfig,
    pub mcp: McpConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub bind: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct McpConfig {
    pub endpoint: McpEndpoint,
    pub connect_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
    pub call_timeout_secs: u64,
    pub resource_timeout_secs: u64,
    pub connect_attempts: u32,
    pub backoff_base_ms: u64,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            endpoint: McpEndpoint::default(),
            connect_timeout_secs: 10,
            handshake_timeout_secs: 5,
            call_timeout_secs: 15,
            resource_timeout_secs: 10,
            connect_attempts: 3,
            backoff_base_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Base URL of an Ollama-compatible server.
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub max_iterations: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1".to_string(),
            temperature: 0.0,
            request_timeout_secs: 120,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Values given on the command line; `None` means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind: Option<String>,
    pub mcp_addr: Option<String>,
    pub mcp_command: Option<String>,
    pub ollama_url: Option<String>,
    pub model: Option<String>,
}

impl Overrides {
    /// Fill unset values from the environment lookup.
    fn or_env(self, env: &dyn Fn(&str) -> Option<String>) -> Self {
        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());
        // The endpoint is one setting: a flag for either form shadows both variables.
        let (mcp_addr, mcp_command) = if self.mcp_addr.is_some() || self.mcp_command.is_some() {
            (self.mcp_addr, self.mcp_command)
        } else {
            (lookup(ENV_MCP_ADDR), lookup(ENV_MCP_COMMAND))
        };
        Self {
            bind: self.bind.or_else(|| lookup(ENV_BIND)),
            mcp_addr,
            mcp_command,
            ollama_url: self.ollama_url.or_else(|| lookup(ENV_OLLAMA_URL)),
            model: self.model.or_else(|| lookup(ENV_MODEL)),
        }
    }
}

impl AssistantConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid assistant configuration")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    pub fn resolve(
        file: Option<&Path>,
        cli: Overrides,
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(cli.or_env(env))?;
        Ok(config)
    }

    fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(bind) = overrides.bind {
            self.http.bind = bind;
        }
        // An explicit command wins over an address from the same layer.
        if let Some(line) = overrides.mcp_command {
            self.mcp.endpoint = McpEndpoint::command_line(&line)
                .with_context(|| format!("empty MCP server command '{line}'"))?;
        } else if let Some(addr) = overrides.mcp_addr {
            self.mcp.endpoint = McpEndpoint::Tcp(addr);
        }
        if let Some(url) = overrides.ollama_url {
            self.model.base_url = url;
        }
        if let Some(model) = overrides.model {
            self.model.model = model;
        }
        Ok(())
    }
}
