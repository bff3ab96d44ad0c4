//! # rconsole-admin
//!
//! Operator-facing admin console for the storefront's game servers.
//! Wires config-backed collaborators into `rconsole-core`'s command
//! service and exposes the privileged `POST /api/command` operation
//! over HTTP.

pub mod config;
pub mod http;
pub mod providers;

use std::sync::Arc;

use rconsole_core::{AccessGate, AuditRecorder, CommandExecutor, CommandService};

use crate::config::AdminConfig;
use crate::http::AppState;
use crate::providers::{ConfigRegistry, ConfigRoles, ConfigSecrets, JsonlAuditSink, TokenBook};

/// Assemble the application state from a loaded configuration.
pub fn build_state(config: &AdminConfig) -> AppState {
    let gate = AccessGate::new(Arc::new(ConfigRoles::from_config(config)));
    let registry = Arc::new(ConfigRegistry::from_config(config));
    let secrets = Arc::new(ConfigSecrets::from_config(config));
    let recorder = AuditRecorder::new(Arc::new(JsonlAuditSink::new(config.audit.path.clone())));
    let executor = CommandExecutor::new(config.timeouts.session());

    AppState {
        service: Arc::new(CommandService::new(
            gate, registry, secrets, recorder, executor,
        )),
        tokens: TokenBook::from_config(config),
        request_timeout: config.timeouts.request(),
    }
}
