//! Command service — authorization, target resolution, credential
//! handling, execution, and auditing wired into one entry point.
//!
//! The control flow mirrors the gated stages of a request:
//!
//! ```text
//! caller ──► gate ──► registry lookup ──► secret resolution ──► executor
//!              │            │                    │                  │
//!              └────────────┴──── audit record per reached stage ───┘
//! ```
//!
//! Each stage is terminal on failure and produces exactly one audit
//! record; earlier successful stages keep theirs.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use zeroize::Zeroizing;

use crate::audit::{AccessKind, AuditEntry, AuditRecorder};
use crate::config::{ExecutionRequest, ServerConfig};
use crate::error::RconError;
use crate::executor::{CommandExecutor, Connector, TcpConnector};
use crate::gate::{AccessGate, CallerIdentity};

// ── Secret ───────────────────────────────────────────────────────

/// A decrypted RCON password.
///
/// The backing string is wiped when the value is dropped, and the value
/// lives only for the call frame of one execution — it is resolved
/// fresh per request and never cached.
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(plaintext: impl Into<String>) -> Self {
        Self(Zeroizing::new(plaintext.into()))
    }

    /// Borrow the plaintext for the handshake.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

// ── External collaborators ───────────────────────────────────────

/// External registry of RCON targets.
#[async_trait]
pub trait ServerRegistry: Send + Sync {
    /// The target with the given name, or `None` when unregistered.
    /// Inactive targets are returned too — rejecting them without a
    /// dial attempt is the executor's job.
    async fn lookup(&self, name: &str) -> Result<Option<ServerConfig>, RconError>;
}

/// External secret resolution. Implementations decrypt with an
/// operator-held key and hand this core only the plaintext.
#[async_trait]
pub trait SecretProvider: Send + Sync {
    async fn rcon_password(&self, server: &ServerConfig) -> Result<Secret, RconError>;
}

// ── CommandReceipt ───────────────────────────────────────────────

/// The successful outcome of one executed command.
#[derive(Debug, Clone, Serialize)]
pub struct CommandReceipt {
    pub server: String,
    pub command: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

// ── CommandService ───────────────────────────────────────────────

/// The privileged `executeCommand` operation.
pub struct CommandService<C: Connector = TcpConnector> {
    gate: AccessGate,
    registry: Arc<dyn ServerRegistry>,
    secrets: Arc<dyn SecretProvider>,
    recorder: AuditRecorder,
    executor: CommandExecutor<C>,
}

impl<C: Connector> CommandService<C> {
    pub fn new(
        gate: AccessGate,
        registry: Arc<dyn ServerRegistry>,
        secrets: Arc<dyn SecretProvider>,
        recorder: AuditRecorder,
        executor: CommandExecutor<C>,
    ) -> Self {
        Self {
            gate,
            registry,
            secrets,
            recorder,
            executor,
        }
    }

    /// Authorize, resolve, execute, and audit one request.
    ///
    /// The request is consumed; it is never reused across calls. No
    /// partial output is ever returned — the result string exists only
    /// after a fully successful handshake and execution.
    pub async fn execute_command(
        &self,
        caller: &CallerIdentity,
        request: ExecutionRequest,
    ) -> Result<CommandReceipt, RconError> {
        let ExecutionRequest { server, command } = request;

        // Stage 1: authorization, strictly before any credential or
        // network effect. No target has been resolved yet, so the
        // record's server field stays absent.
        let _proof = match self.gate.authorize(caller).await {
            Ok(proof) => proof,
            Err(e) => {
                self.recorder
                    .record(
                        AuditEntry::failure(caller, AccessKind::CommandExecution, &e)
                            .with_command(&command),
                    )
                    .await;
                return Err(e);
            }
        };

        // Stage 2: registry lookup.
        let target = match self.registry.lookup(&server).await {
            Ok(Some(target)) => {
                self.recorder
                    .record(
                        AuditEntry::success(caller, AccessKind::ServerLookup)
                            .with_server(&target.name),
                    )
                    .await;
                target
            }
            Ok(None) => {
                let e = RconError::ServerNotFound(server);
                self.recorder
                    .record(AuditEntry::failure(caller, AccessKind::ServerLookup, &e))
                    .await;
                return Err(e);
            }
            Err(e) => {
                self.recorder
                    .record(AuditEntry::failure(caller, AccessKind::ServerLookup, &e))
                    .await;
                return Err(e);
            }
        };

        // Stage 3: secret resolution, fresh per call. The plaintext is
        // scoped to this frame and wiped on drop.
        let secret = match self.secrets.rcon_password(&target).await {
            Ok(secret) => {
                self.recorder
                    .record(
                        AuditEntry::success(caller, AccessKind::PasswordAccess)
                            .with_server(&target.name),
                    )
                    .await;
                secret
            }
            Err(e) => {
                self.recorder
                    .record(
                        AuditEntry::failure(caller, AccessKind::PasswordAccess, &e)
                            .with_server(&target.name),
                    )
                    .await;
                return Err(e);
            }
        };

        // Stage 4: the protocol round-trip.
        match self
            .executor
            .execute(&target, secret.expose(), &command)
            .await
        {
            Ok(result) => {
                self.recorder
                    .record(
                        AuditEntry::success(caller, AccessKind::CommandExecution)
                            .with_server(&target.name)
                            .with_command(&command),
                    )
                    .await;
                info!(
                    target: "rconsole::service",
                    actor = %caller.user_id,
                    server = %target.name,
                    command = %command,
                    "remote command executed"
                );
                Ok(CommandReceipt {
                    server: target.name,
                    command,
                    result,
                    timestamp: Utc::now(),
                })
            }
            Err(e) => {
                self.recorder
                    .record(
                        AuditEntry::failure(caller, AccessKind::CommandExecution, &e)
                            .with_server(&target.name)
                            .with_command(&command),
                    )
                    .await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_never_prints_plaintext() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{secret:?}"), "Secret(***)");
        assert_eq!(secret.expose(), "hunter2");
    }
}
