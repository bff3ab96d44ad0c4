//! Command executor — the protocol-pure entry point.
//!
//! Takes a target, a credential, and an opaque command string, drives
//! one session through `connect → authenticate → execute → close`, and
//! returns the command output or a typed failure. Auditing is
//! deliberately not done here; it belongs to the service layer so this
//! stays independently testable against a bare socket.

use async_trait::async_trait;
use tracing::debug;

use crate::config::{ServerConfig, SessionTimeouts};
use crate::error::RconError;
use crate::session::Session;

// ── Connector ────────────────────────────────────────────────────

/// Dials a transport session for a target.
///
/// The production implementation is [`TcpConnector`]; tests substitute
/// implementations that count or refuse connection attempts.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        target: &ServerConfig,
        timeouts: SessionTimeouts,
    ) -> Result<Session, RconError>;
}

/// Dials a plain TCP connection to the target's `host:port`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(
        &self,
        target: &ServerConfig,
        timeouts: SessionTimeouts,
    ) -> Result<Session, RconError> {
        Session::connect(&target.host, target.port, timeouts).await
    }
}

// ── CommandExecutor ──────────────────────────────────────────────

/// Executes one command per call over one freshly dialed session.
///
/// No connection pooling, no reconnects, no retries: a failure at any
/// step is terminal for the call and the socket is released on every
/// exit path.
#[derive(Debug, Clone)]
pub struct CommandExecutor<C: Connector = TcpConnector> {
    connector: C,
    timeouts: SessionTimeouts,
}

impl CommandExecutor<TcpConnector> {
    pub fn new(timeouts: SessionTimeouts) -> Self {
        Self::with_connector(TcpConnector, timeouts)
    }
}

impl<C: Connector> CommandExecutor<C> {
    pub fn with_connector(connector: C, timeouts: SessionTimeouts) -> Self {
        Self {
            connector,
            timeouts,
        }
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        self.timeouts
    }

    /// Run `command` on `target`, authenticating with `credential`.
    ///
    /// Rejections that require no network activity happen first: an
    /// empty command is `InvalidCommand` and a disabled target is
    /// `ServerInactive` — disabled targets are never dialed, regardless
    /// of reachability.
    pub async fn execute(
        &self,
        target: &ServerConfig,
        credential: &str,
        command: &str,
    ) -> Result<String, RconError> {
        if command.trim().is_empty() {
            return Err(RconError::InvalidCommand("command is empty"));
        }
        if command.contains('\0') {
            return Err(RconError::InvalidCommand("embedded NUL byte"));
        }
        if !target.is_active {
            return Err(RconError::ServerInactive(target.name.clone()));
        }

        debug!(target: "rconsole::executor", server = %target, "dialing");
        let mut session = self.connector.connect(target, self.timeouts).await?;

        let result = run(&mut session, credential, command).await;
        // Release the socket on success and on every failure path.
        session.close().await;
        result
    }
}

async fn run(session: &mut Session, credential: &str, command: &str) -> Result<String, RconError> {
    session.authenticate(credential).await?;
    session.execute(command).await
}
