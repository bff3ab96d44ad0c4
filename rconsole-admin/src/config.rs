//! Admin console configuration.
//!
//! Loaded at startup from a TOML file and passed explicitly to every
//! component — no environment-sourced globals. All sections have
//! defaults so a development instance runs from an empty file; a real
//! deployment must at least declare servers and operators.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use rconsole_core::{ServerConfig, SessionTimeouts};

/// Complete admin service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// HTTP listener settings.
    pub listen: ListenSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Network deadlines for RCON sessions and requests.
    pub timeouts: TimeoutSettings,
    /// Audit trail settings.
    pub audit: AuditSettings,
    /// Managed game servers.
    pub servers: Vec<ServerEntry>,
    /// Operators allowed to call the API.
    pub operators: Vec<OperatorEntry>,
}

impl AdminConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load from a file; a missing file yields the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Self::from_toml(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path, "config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenSettings {
    pub addr: String,
    pub port: u16,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1".into(),
            port: 8085,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: "trace", "debug", "info", "warn", "error".
    pub level: String,
    /// Format: "text" or "json".
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

/// Network deadlines, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// TCP dial deadline.
    pub connect_secs: u64,
    /// Per-read/write deadline on an open session.
    pub io_secs: u64,
    /// End-to-end deadline for one API request.
    pub request_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            io_secs: 10,
            request_secs: 30,
        }
    }
}

impl TimeoutSettings {
    pub fn session(&self) -> SessionTimeouts {
        SessionTimeouts {
            connect: Duration::from_secs(self.connect_secs),
            io: Duration::from_secs(self.io_secs),
        }
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

/// Audit trail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// Append-only JSONL file the audit trail is written to.
    pub path: String,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            path: "rcon-audit.jsonl".into(),
        }
    }
}

/// One managed game server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerEntry {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Disabled servers stay listed but are never dialed.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Operator-held RCON password for this server.
    pub password: String,
}

fn default_active() -> bool {
    true
}

impl ServerEntry {
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            name: self.name.clone(),
            host: self.host.clone(),
            port: self.port,
            is_active: self.active,
        }
    }
}

/// One operator allowed to call the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorEntry {
    /// Stable identity recorded in the audit trail.
    pub user: String,
    /// Bearer token presented by the operator's client.
    pub token: String,
    /// Role consulted by the access gate; only "admin" may execute.
    pub role: String,
}
