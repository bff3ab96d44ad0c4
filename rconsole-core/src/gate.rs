//! Access-control gate.
//!
//! Authorization is evaluated strictly before the credential is
//! resolved and before any network call: an unauthorized caller causes
//! zero secret fetches and zero connection attempts. The gate consumes
//! an external role lookup and accepts exactly one role value — there
//! is no per-command allowlisting at this layer.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::RconError;

/// The single role sufficient to pass the gate.
pub const ADMIN_ROLE: &str = "admin";

// ── CallerIdentity ───────────────────────────────────────────────

/// Who is asking, and from where.
///
/// `source_addr` and `user_agent` exist for the audit trail; they play
/// no part in the authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: String,
    pub source_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl CallerIdentity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            source_addr: None,
            user_agent: None,
        }
    }

    pub fn with_source(mut self, addr: impl Into<String>) -> Self {
        self.source_addr = Some(addr.into());
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }
}

// ── RoleProvider ─────────────────────────────────────────────────

/// External identity → role lookup.
#[async_trait]
pub trait RoleProvider: Send + Sync {
    /// The caller's role, or `None` when the identity is unknown.
    async fn role_of(&self, user_id: &str) -> Result<Option<String>, RconError>;
}

// ── AccessGate ───────────────────────────────────────────────────

/// Proof that the gate admitted a caller. Only this module can mint
/// one, so an API that demands it cannot be reached around the gate.
#[derive(Debug, Clone, Copy)]
pub struct AdminProof {
    _priv: (),
}

/// Verifies caller privilege against the external role lookup.
pub struct AccessGate {
    roles: Arc<dyn RoleProvider>,
}

impl AccessGate {
    pub fn new(roles: Arc<dyn RoleProvider>) -> Self {
        Self { roles }
    }

    /// Admit the caller or fail with `Unauthorized`.
    pub async fn authorize(&self, caller: &CallerIdentity) -> Result<AdminProof, RconError> {
        match self.roles.role_of(&caller.user_id).await? {
            Some(role) if role == ADMIN_ROLE => Ok(AdminProof { _priv: () }),
            _ => Err(RconError::Unauthorized),
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────
