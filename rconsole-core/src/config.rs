//! Execution target and request types.
//!
//! A [`ServerConfig`] deliberately carries no credential: the RCON
//! password is fetched just-in-time from a secret provider and never
//! lives in this entity.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ── ServerConfig ─────────────────────────────────────────────────

/// Identity of one RCON endpoint as known to the server registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Registry name the operator refers to the server by.
    pub name: String,
    /// Hostname or IP address of the game server.
    pub host: String,
    /// RCON listener port.
    pub port: u16,
    /// Disabled targets are rejected before any connection attempt.
    pub is_active: bool,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            is_active: true,
        }
    }

    /// The `host:port` dial string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.addr())
    }
}

// ── ExecutionRequest ─────────────────────────────────────────────

/// One command bound for one target. Created per API call, consumed
/// once, never cached or reused across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Registry name of the target server.
    pub server: String,
    /// Opaque command text; this core never interprets it.
    pub command: String,
}

impl ExecutionRequest {
    pub fn new(server: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            command: command.into(),
        }
    }
}

// ── SessionTimeouts ──────────────────────────────────────────────

/// Deadlines applied to one transport session.
///
/// `connect` bounds the TCP dial; `io` bounds every individual read and
/// write afterwards. Both exist to keep a misconfigured or unreachable
/// endpoint from stalling a request indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionTimeouts {
    pub connect: Duration,
    pub io: Duration,
}

impl SessionTimeouts {
    /// The same deadline for the dial and for every IO operation.
    pub fn uniform(deadline: Duration) -> Self {
        Self {
            connect: deadline,
            io: deadline,
        }
    }
}

impl Default for SessionTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(5),
            io: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_formats_dial_string() {
        let config = ServerConfig::new("main", "mc.example.net", 25575);
        assert_eq!(config.addr(), "mc.example.net:25575");
        assert!(config.is_active);
    }

    #[test]
    fn uniform_timeouts() {
        let t = SessionTimeouts::uniform(Duration::from_secs(2));
        assert_eq!(t.connect, t.io);
    }
}
