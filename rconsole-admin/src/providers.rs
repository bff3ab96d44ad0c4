//! Config-backed implementations of the core's collaborator traits.
//!
//! A deployment of the storefront backs these with its database and
//! key-management service; the admin console keeps everything in the
//! operator-maintained config file. Secrets are resolved fresh on each
//! call — nothing is cached between requests.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use rconsole_core::{
    AuditEntry, AuditSink, RconError, RoleProvider, Secret, SecretProvider, ServerConfig,
    ServerRegistry,
};

use crate::config::AdminConfig;

// ── ConfigRegistry ───────────────────────────────────────────────

/// Server registry backed by the `[[servers]]` config section.
pub struct ConfigRegistry {
    servers: Vec<ServerConfig>,
}

impl ConfigRegistry {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            servers: config
                .servers
                .iter()
                .map(|entry| entry.to_server_config())
                .collect(),
        }
    }
}

#[async_trait]
impl ServerRegistry for ConfigRegistry {
    async fn lookup(&self, name: &str) -> Result<Option<ServerConfig>, RconError> {
        Ok(self.servers.iter().find(|s| s.name == name).cloned())
    }
}

// ── ConfigSecrets ────────────────────────────────────────────────

/// Secret provider handing out the operator-held RCON passwords.
pub struct ConfigSecrets {
    passwords: HashMap<String, String>,
}

impl ConfigSecrets {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            passwords: config
                .servers
                .iter()
                .map(|entry| (entry.name.clone(), entry.password.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl SecretProvider for ConfigSecrets {
    async fn rcon_password(&self, server: &ServerConfig) -> Result<Secret, RconError> {
        self.passwords
            .get(&server.name)
            .map(|password| Secret::new(password.clone()))
            .ok_or_else(|| {
                RconError::CredentialUnavailable(format!(
                    "no password on file for '{}'",
                    server.name
                ))
            })
    }
}

// ── ConfigRoles ──────────────────────────────────────────────────

/// Role lookup backed by the `[[operators]]` config section.
pub struct ConfigRoles {
    roles: HashMap<String, String>,
}

impl ConfigRoles {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            roles: config
                .operators
                .iter()
                .map(|op| (op.user.clone(), op.role.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl RoleProvider for ConfigRoles {
    async fn role_of(&self, user_id: &str) -> Result<Option<String>, RconError> {
        Ok(self.roles.get(user_id).cloned())
    }
}

// ── TokenBook ────────────────────────────────────────────────────

/// Bearer token → operator identity.
#[derive(Clone)]
pub struct TokenBook {
    tokens: HashMap<String, String>,
}

impl TokenBook {
    pub fn from_config(config: &AdminConfig) -> Self {
        Self {
            tokens: config
                .operators
                .iter()
                .map(|op| (op.token.clone(), op.user.clone()))
                .collect(),
        }
    }

    /// The operator owning `token`, if any.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.tokens.get(token).map(String::as_str)
    }
}

// ── JsonlAuditSink ───────────────────────────────────────────────

/// Append-only audit store: one JSON object per line.
///
/// Rotation and retention are an operations concern; this sink only
/// ever appends.
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AuditSink for JsonlAuditSink {
    async fn record(&self, entry: AuditEntry) -> Result<(), RconError> {
        let mut line = serde_json::to_string(&entry)
            .map_err(|e| RconError::Connection(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rconsole_core::{AccessKind, CallerIdentity};

    fn sample_config() -> AdminConfig {
        AdminConfig::from_toml(
            r#"
            [[servers]]
            name = "main"
            host = "127.0.0.1"
            port = 25575
            password = "hunter2"

            [[operators]]
            user = "ops-1"
            token = "tok_abc"
            role = "admin"
            "#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn registry_and_secrets_resolve_known_server() {
        let config = sample_config();
        let registry = ConfigRegistry::from_config(&config);
        let secrets = ConfigSecrets::from_config(&config);

        let server = registry.lookup("main").await.unwrap().unwrap();
        assert_eq!(server.port, 25575);

        let secret = secrets.rcon_password(&server).await.unwrap();
        assert_eq!(secret.expose(), "hunter2");

        assert!(registry.lookup("other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_password_is_credential_unavailable() {
        let secrets = ConfigSecrets::from_config(&AdminConfig::default());
        let server = ServerConfig::new("ghost", "127.0.0.1", 25575);
        let result = secrets.rcon_password(&server).await;
        assert!(matches!(result, Err(RconError::CredentialUnavailable(_))));
    }

    #[tokio::test]
    async fn token_book_resolves_operators() {
        let book = TokenBook::from_config(&sample_config());
        assert_eq!(book.resolve("tok_abc"), Some("ops-1"));
        assert_eq!(book.resolve("tok_unknown"), None);
    }

    #[tokio::test]
    async fn jsonl_sink_appends_one_line_per_record() {
        let dir = std::env::temp_dir().join(format!("rconsole-audit-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("audit.jsonl");

        let sink = JsonlAuditSink::new(&path);
        let caller = CallerIdentity::new("ops-1");
        sink.record(AuditEntry::success(&caller, AccessKind::ServerLookup).with_server("main"))
            .await
            .unwrap();
        sink.record(
            AuditEntry::success(&caller, AccessKind::CommandExecution).with_command("list"),
        )
        .await
        .unwrap();

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["kind"], "server_lookup");
        assert_eq!(first["server"], "main");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
