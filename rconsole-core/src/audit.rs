//! Tamper-evident audit trail for credential access and command
//! execution.
//!
//! Every gated stage of a request produces exactly one [`AuditEntry`] —
//! success or failure — and entries are never mutated or deleted here;
//! retention is the sink's concern. Recording is fire-and-forget for
//! the caller: a failing sink is logged and never replaces the
//! operation's own result.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::RconError;
use crate::gate::CallerIdentity;

// ── AccessKind ───────────────────────────────────────────────────

/// Which gated stage the entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    /// Registry lookup of the target server.
    ServerLookup,
    /// Resolution of the plaintext RCON password.
    PasswordAccess,
    /// The command execution attempt itself (also used for requests
    /// rejected before a target was ever resolved).
    CommandExecution,
}

impl std::fmt::Display for AccessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServerLookup => write!(f, "server_lookup"),
            Self::PasswordAccess => write!(f, "password_access"),
            Self::CommandExecution => write!(f, "command_execution"),
        }
    }
}

// ── AuditEntry ───────────────────────────────────────────────────

/// Immutable record of one access attempt.
///
/// `server` stays absent when no valid target existed at the time of
/// the attempt (unknown server, unauthorized caller) — the record is
/// still written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub actor: String,
    pub kind: AccessKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Stable error-category token (see [`RconError::category`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    fn base(caller: &CallerIdentity, kind: AccessKind, success: bool) -> Self {
        Self {
            actor: caller.user_id.clone(),
            kind,
            server: None,
            command: None,
            source_addr: caller.source_addr.clone(),
            user_agent: caller.user_agent.clone(),
            success,
            error: None,
            error_kind: None,
            timestamp: Utc::now(),
        }
    }

    /// A successful attempt at `kind`.
    pub fn success(caller: &CallerIdentity, kind: AccessKind) -> Self {
        Self::base(caller, kind, true)
    }

    /// A failed attempt at `kind`, carrying the error's message and
    /// category token.
    pub fn failure(caller: &CallerIdentity, kind: AccessKind, error: &RconError) -> Self {
        let mut entry = Self::base(caller, kind, false);
        entry.error = Some(error.to_string());
        entry.error_kind = Some(error.category().to_string());
        entry
    }

    pub fn with_server(mut self, name: impl Into<String>) -> Self {
        self.server = Some(name.into());
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

// ── AuditSink ────────────────────────────────────────────────────

/// Append-only destination for audit entries. No read API is required
/// by this core.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), RconError>;
}

// ── AuditRecorder ────────────────────────────────────────────────

/// Fire-and-forget wrapper around the sink.
///
/// Must not be skipped on any code path; must not mask the recorded
/// operation's result. A sink failure is therefore logged here and
/// swallowed rather than surfaced to the caller.
#[derive(Clone)]
pub struct AuditRecorder {
    sink: Arc<dyn AuditSink>,
}

impl AuditRecorder {
    pub fn new(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }

    pub async fn record(&self, entry: AuditEntry) {
        let kind = entry.kind;
        if let Err(e) = self.sink.record(entry).await {
            warn!(target: "rconsole::audit", %kind, error = %e, "audit sink rejected record");
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
