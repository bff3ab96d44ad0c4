//! HTTP surface of the admin console.
//!
//! One privileged operation: `POST /api/command` executes a command on
//! a managed game server and returns
//! `{ success, result | error, timestamp }`. Callers authenticate with
//! a bearer token; the identity behind the token still has to pass the
//! core's admin gate, so a leaked non-admin token cannot execute
//! anything.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use rconsole_core::{CallerIdentity, CommandService, ExecutionRequest, RconError};

use crate::providers::TokenBook;

// ── State ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CommandService>,
    pub tokens: TokenBook,
    pub request_timeout: Duration,
}

/// Build the admin router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/command", post(execute_command))
        .with_state(state)
}

// ── Handlers ─────────────────────────────────────────────────────

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    /// Registry name of the target; the storefront's primary server
    /// when omitted.
    #[serde(default = "default_server")]
    server: String,
    command: String,
}

fn default_server() -> String {
    "main".to_string()
}

async fn execute_command(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<CommandRequest>,
) -> Response {
    let Some(user) = bearer_token(&headers).and_then(|token| state.tokens.resolve(token)) else {
        return error_response(
            StatusCode::UNAUTHORIZED,
            "missing or unknown bearer token",
            "unauthorized",
        );
    };

    let mut caller = CallerIdentity::new(user);
    if let Some(ConnectInfo(addr)) = peer {
        caller = caller.with_source(addr.to_string());
    }
    if let Some(agent) = user_agent(&headers) {
        caller = caller.with_user_agent(agent);
    }

    debug!(target: "rconsole::http", actor = %caller.user_id, server = %request.server, "command request");

    let execution = state
        .service
        .execute_command(&caller, ExecutionRequest::new(request.server, request.command));
    match tokio::time::timeout(state.request_timeout, execution).await {
        Ok(Ok(receipt)) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "server": receipt.server,
                "command": receipt.command,
                "result": receipt.result,
                "timestamp": receipt.timestamp,
            })),
        )
            .into_response(),
        Ok(Err(e)) => error_response(status_for(&e), &e.to_string(), e.category()),
        // The deadline also cancels the in-flight session, which closes
        // its socket on drop.
        Err(_) => error_response(
            StatusCode::GATEWAY_TIMEOUT,
            "request deadline exceeded",
            "timeout",
        ),
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

fn user_agent(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
}

/// JSON error envelope shared by every failure path.
fn error_response(status: StatusCode, message: &str, code: &str) -> Response {
    (
        status,
        Json(json!({
            "success": false,
            "error": message,
            "code": code,
            "timestamp": Utc::now(),
        })),
    )
        .into_response()
}

fn status_for(error: &RconError) -> StatusCode {
    match error {
        RconError::Unauthorized => StatusCode::FORBIDDEN,
        RconError::ServerNotFound(_) => StatusCode::NOT_FOUND,
        RconError::ServerInactive(_) => StatusCode::CONFLICT,
        RconError::InvalidCommand(_) => StatusCode::BAD_REQUEST,
        RconError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        RconError::CredentialUnavailable(_)
        | RconError::Connection(_)
        | RconError::AuthenticationFailed
        | RconError::MalformedPacket(_)
        | RconError::ProtocolViolation(_) => StatusCode::BAD_GATEWAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer tok_123"),
        );
        assert_eq!(bearer_token(&headers), Some("tok_123"));
    }

    #[test]
    fn bearer_token_requires_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("tok_123"));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn status_mapping_follows_error_category() {
        use std::io;

        assert_eq!(status_for(&RconError::Unauthorized), StatusCode::FORBIDDEN);
        assert_eq!(
            status_for(&RconError::ServerNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&RconError::ServerInactive("x".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&RconError::InvalidCommand("command is empty")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&RconError::Timeout(Duration::from_secs(1))),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            status_for(&RconError::AuthenticationFailed),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_for(&RconError::Connection(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused"
            ))),
            StatusCode::BAD_GATEWAY
        );
    }
}
