//! Connection management for the store tool service.
//!
//! A [`Connector`] owns at most one live [`ToolSession`]. Connecting, marking
//! a session broken and reconnecting all happen under one async lock; a
//! caller that waited on the lock while another connect attempt finished
//! takes that attempt's outcome instead of starting its own.

mod decode;
mod mcp;
mod session;
mod store;

pub use decode::{decode_resource, decode_tool_result};
pub use mcp::{McpEndpoint, McpOpener};
pub use session::{PendingSession, SessionError, SessionOpener, ToolSession};
pub use store::HealthReport;

use crate::config::McpConfig;
use crate::error::{ConnectorError, ConnectorResult};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug, Clone)]
pub struct ConnectorSettings {
    pub connect_timeout: Duration,
    pub handshake_timeout: Duration,
    pub call_timeout: Duration,
    pub resource_timeout: Duration,
}

impl Default for ConnectorSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(5),
            call_timeout: Duration::from_secs(15),
            resource_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&McpConfig> for ConnectorSettings {
    fn from(config: &McpConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            handshake_timeout: Duration::from_secs(config.handshake_timeout_secs),
            call_timeout: Duration::from_secs(config.call_timeout_secs),
            resource_timeout: Duration::from_secs(config.resource_timeout_secs),
        }
    }
}

#[derive(Clone)]
struct Active {
    epoch: u64,
    session: Arc<dyn ToolSession>,
}

#[derive(Default)]
struct Link {
    active: Option<Active>,
    epoch: u64,
    last_error: Option<String>,
}

/// A failed request on one session, split by whether the stream survived.
enum CallFailure {
    Broken(String),
    Other(ConnectorError),
}

pub struct Connector {
    opener: Arc<dyn SessionOpener>,
    settings: ConnectorSettings,
    link: Mutex<Link>,
    /// Completed connect attempts; only advanced while `link` is held.
    attempts: AtomicU64,
    state: watch::Sender<ConnectionState>,
}

impl Connector {
    pub fn new(opener: Arc<dyn SessionOpener>, settings: ConnectorSettings) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            opener,
            settings,
            link: Mutex::new(Link::default()),
            attempts: AtomicU64::new(0),
            state,
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Number of connect attempts that have run to completion.
    pub fn connect_attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    fn publish(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }

    /// Establish a fresh session, replacing any existing one.
    pub async fn connect(&self) -> ConnectorResult<()> {
        let seen = self.attempts.load(Ordering::SeqCst);
        self.connect_after(seen, true).await.map(|_| ())
    }

    /// Startup acquisition: up to `max_attempts` connects, doubling the delay after each failure.
    pub async fn connect_with_retries(
        &self,
        max_attempts: u32,
        base_delay: Duration,
    ) -> ConnectorResult<()> {
        let max_attempts = max_attempts.max(1);
        let mut delay = base_delay;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match self.connect().await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    log::warn!("connect attempt {attempt}/{max_attempts} failed: {err}");
                    last_error = Some(err);
                }
            }
            if attempt < max_attempts {
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
        }

        let err = last_error.unwrap_or_else(ConnectorError::not_connected);
        log::error!("giving up on the tool service after {max_attempts} attempts: {err}");
        Err(err)
    }

    pub async fn disconnect(&self) {
        let mut link = self.link.lock().await;
        if let Some(active) = link.active.take() {
            active.session.close().await;
            log::info!("disconnected from the tool service");
        }
        self.publish(ConnectionState::Disconnected);
    }

    /// Run one connect attempt unless another one completed since `seen`.
    ///
    /// With `replace` unset an existing session is returned as is.
    async fn connect_after(&self, seen: u64, replace: bool) -> ConnectorResult<Active> {
        let mut link = self.link.lock().await;

        if self.attempts.load(Ordering::SeqCst) != seen {
            return match &link.active {
                Some(active) => Ok(active.clone()),
                None => Err(ConnectorError::Connection(
                    link.last_error
                        .clone()
                        .unwrap_or_else(|| "Not connected to server".to_string()),
                )),
            };
        }
        if !replace {
            if let Some(active) = &link.active {
                return Ok(active.clone());
            }
        }

        if let Some(previous) = link.active.take() {
            previous.session.close().await;
        }

        self.publish(ConnectionState::Connecting);
        log::info!("connecting to the tool service");
        let outcome = self.open_session().await;
        self.attempts.fetch_add(1, Ordering::SeqCst);

        match outcome {
            Ok(session) => {
                link.epoch += 1;
                let active = Active {
                    epoch: link.epoch,
                    session,
                };
                link.active = Some(active.clone());
                link.last_error = None;
                self.publish(ConnectionState::Connected);
                Ok(active)
            }
            Err(err) => {
                link.last_error = Some(err.to_string());
                self.publish(ConnectionState::Disconnected);
                Err(err)
            }
        }
    }

    async fn open_session(&self) -> ConnectorResult<Arc<dyn ToolSession>> {
        let connect_timeout = self.settings.connect_timeout;
        let mut pending = tokio::time::timeout(connect_timeout, self.opener.open())
            .await
            .map_err(|_| {
                ConnectorError::Connection(format!("connect timed out after {connect_timeout:?}"))
            })??;

        let handshake_timeout = self.settings.handshake_timeout;
        tokio::time::timeout(handshake_timeout, pending.handshake())
            .await
            .map_err(|_| {
                ConnectorError::Connection(format!(
                    "handshake timed out after {handshake_timeout:?}"
                ))
            })?
    }

    /// The live session, connecting once if there is none.
    async fn active(&self) -> ConnectorResult<Active> {
        let seen = self.attempts.load(Ordering::SeqCst);
        if let Some(active) = self.link.lock().await.active.clone() {
            return Ok(active);
        }
        self.connect_after(seen, false).await
    }

    /// Drop the session of `epoch` if it is still the current one.
    async fn invalidate(&self, epoch: u64) {
        let mut link = self.link.lock().await;
        if link.active.as_ref().is_some_and(|a| a.epoch == epoch) {
            if let Some(active) = link.active.take() {
                active.session.close().await;
            }
            self.publish(ConnectionState::Disconnected);
        }
    }

    /// Replace a broken session, folding with any reconnect already in flight.
    async fn recover(&self, broken_epoch: u64) -> ConnectorResult<Active> {
        let seen = self.attempts.load(Ordering::SeqCst);
        {
            let mut link = self.link.lock().await;
            match &link.active {
                Some(current) if current.epoch != broken_epoch => return Ok(current.clone()),
                Some(_) => {
                    if let Some(active) = link.active.take() {
                        active.session.close().await;
                    }
                    self.publish(ConnectionState::Disconnected);
                }
                None => {}
            }
        }
        self.connect_after(seen, false).await
    }

    async fn call_once(
        &self,
        active: &Active,
        name: &str,
        arguments: &Map<String, Value>,
        timeout: Duration,
    ) -> Result<Value, CallFailure> {
        log::debug!("calling tool {name}");
        let result = tokio::time::timeout(timeout, active.session.call_tool(name, arguments.clone()))
            .await
            .map_err(|_| {
                CallFailure::Other(ConnectorError::Timeout {
                    operation: format!("tool '{name}'"),
                    after: timeout,
                })
            })?;

        match result {
            Ok(result) => decode_tool_result(result).map_err(CallFailure::Other),
            Err(SessionError::Closed(reason)) => Err(CallFailure::Broken(reason)),
            Err(SessionError::Rejected(reason)) => Err(CallFailure::Other(ConnectorError::Tool(reason))),
        }
    }

    /// Invoke a tool and decode its JSON result.
    ///
    /// `timeout` defaults to the configured call timeout. A broken stream
    /// with `allow_retry` set triggers one reconnect and one more attempt;
    /// timeouts are never retried.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Map<String, Value>,
        timeout: Option<Duration>,
        allow_retry: bool,
    ) -> ConnectorResult<Value> {
        let timeout = timeout.unwrap_or(self.settings.call_timeout);
        let active = self.active().await?;

        let original = match self.call_once(&active, name, &arguments, timeout).await {
            Ok(value) => return Ok(value),
            Err(CallFailure::Other(err)) => {
                log::error!("tool {name} failed: {err}");
                return Err(err);
            }
            Err(CallFailure::Broken(reason)) => reason,
        };

        if !allow_retry {
            log::error!("tool {name} failed on a broken connection: {original}");
            self.invalidate(active.epoch).await;
            return Err(ConnectorError::Connection(original));
        }

        log::warn!("connection lost during {name} ({original}); reconnecting once");
        let fresh = self.recover(active.epoch).await.map_err(|err| {
            log::error!("reconnect for {name} failed: {err}");
            ConnectorError::ReconnectFailed {
                original: original.clone(),
                reconnect: err.to_string(),
            }
        })?;

        match self.call_once(&fresh, name, &arguments, timeout).await {
            Ok(value) => Ok(value),
            Err(CallFailure::Other(err)) => {
                log::error!("tool {name} failed after reconnect: {err}");
                Err(err)
            }
            Err(CallFailure::Broken(reason)) => {
                log::error!("tool {name} failed again after reconnect: {reason}");
                self.invalidate(fresh.epoch).await;
                Err(ConnectorError::Connection(reason))
            }
        }
    }

    /// Read a resource; requires an established session and is never retried.
    pub async fn read_resource(&self, uri: &str) -> ConnectorResult<Value> {
        let active = self
            .link
            .lock()
            .await
            .active
            .clone()
            .ok_or_else(ConnectorError::not_connected)?;

        let timeout = self.settings.resource_timeout;
        let text = tokio::time::timeout(timeout, active.session.read_resource(uri))
            .await
            .map_err(|_| ConnectorError::Timeout {
                operation: format!("resource '{uri}'"),
                after: timeout,
            })?;

        let text = match text {
            Ok(text) => text,
            Err(SessionError::Rejected(reason)) => {
                log::error!("reading {uri} was rejected: {reason}");
                return Err(ConnectorError::Tool(reason));
            }
            Err(SessionError::Closed(reason)) => {
                log::error!("reading {uri} failed: {reason}");
                self.invalidate(active.epoch).await;
                return Err(ConnectorError::Connection(format!(
                    "failed to read {uri}: {reason}"
                )));
            }
        };

        decode_resource(uri, &text)
    }
}
