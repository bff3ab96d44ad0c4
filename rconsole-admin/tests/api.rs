//! API tests — the admin router against an in-process service, with a
//! scripted mock RCON server on localhost for the full path.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_util::codec::Framed;
use tower::ServiceExt;

use rconsole_admin::config::AdminConfig;
use rconsole_admin::{build_state, http};
use rconsole_core::packet::AUTH_FAILED_ID;
use rconsole_core::{Packet, RconCodec};

// ── Helpers ──────────────────────────────────────────────────────

/// Accept one client and serve one command, echoing the handshake and
/// answering the command with `reply`.
fn spawn_mock_rcon(listener: TcpListener, password: &'static str, reply: &'static str) {
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut framed = Framed::new(stream, RconCodec::client());

        let auth = framed.next().await.unwrap().unwrap();
        if auth.body() != password {
            framed
                .send(Packet::auth_response(AUTH_FAILED_ID))
                .await
                .unwrap();
            return;
        }
        framed.send(Packet::auth_response(auth.id())).await.unwrap();

        let command = framed.next().await.unwrap().unwrap();
        let probe = framed.next().await.unwrap().unwrap();
        framed
            .send(Packet::response(command.id(), reply).unwrap())
            .await
            .unwrap();
        framed
            .send(Packet::response(probe.id(), "").unwrap())
            .await
            .unwrap();
    });
}

fn audit_path(tag: &str) -> String {
    std::env::temp_dir()
        .join(format!("rconsole-api-{tag}-{}.jsonl", std::process::id()))
        .to_string_lossy()
        .into_owned()
}

/// Config with one admin, one non-admin, and one registered server.
fn test_config(tag: &str, host: &str, port: u16) -> AdminConfig {
    AdminConfig::from_toml(&format!(
        r#"
        [audit]
        path = "{path}"

        [timeouts]
        connect_secs = 2
        io_secs = 2
        request_secs = 5

        [[servers]]
        name = "main"
        host = "{host}"
        port = {port}
        password = "hunter2"

        [[operators]]
        user = "ops-1"
        token = "tok_admin"
        role = "admin"

        [[operators]]
        user = "support-2"
        token = "tok_support"
        role = "support"
        "#,
        path = audit_path(tag),
    ))
    .unwrap()
}

fn command_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/command")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────

#[tokio::test]
async fn health_endpoint_is_open() {
    let router = http::router(build_state(&test_config("health", "127.0.0.1", 25575)));
    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let router = http::router(build_state(&test_config("no-token", "127.0.0.1", 25575)));
    let response = router
        .oneshot(command_request(None, json!({ "command": "list" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn non_admin_operator_is_forbidden() {
    let router = http::router(build_state(&test_config("non-admin", "127.0.0.1", 25575)));
    let response = router
        .oneshot(command_request(
            Some("tok_support"),
            json!({ "command": "list" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], "unauthorized");
}

#[tokio::test]
async fn unknown_server_is_not_found() {
    let router = http::router(build_state(&test_config("unknown", "127.0.0.1", 25575)));
    let response = router
        .oneshot(command_request(
            Some("tok_admin"),
            json!({ "server": "eu-lobby", "command": "list" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["code"], "server_not_found");
}

#[tokio::test]
async fn empty_command_is_bad_request() {
    let router = http::router(build_state(&test_config("empty", "127.0.0.1", 25575)));
    let response = router
        .oneshot(command_request(
            Some("tok_admin"),
            json!({ "command": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "invalid_command");
}

#[tokio::test]
async fn command_round_trip_over_http() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    spawn_mock_rcon(listener, "hunter2", "There are 3 players online");

    let config = test_config("round-trip", &addr.ip().to_string(), addr.port());
    let audit_file = config.audit.path.clone();
    let router = http::router(build_state(&config));

    // The request omits the server name; it defaults to "main".
    let response = router
        .oneshot(command_request(
            Some("tok_admin"),
            json!({ "command": "list" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["result"], "There are 3 players online");
    assert_eq!(body["command"], "list");
    assert_eq!(body["server"], "main");
    assert!(body["timestamp"].is_string());

    // The audit trail recorded lookup, password access, and execution.
    let contents = tokio::fs::read_to_string(&audit_file).await.unwrap();
    let kinds: Vec<String> = contents
        .lines()
        .map(|line| {
            let v: Value = serde_json::from_str(line).unwrap();
            v["kind"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(kinds, ["server_lookup", "password_access", "command_execution"]);

    let _ = tokio::fs::remove_file(&audit_file).await;
}

#[tokio::test]
async fn rejected_password_maps_to_bad_gateway() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // The config's password is "hunter2"; this server wants another.
    spawn_mock_rcon(listener, "rotated-since", "");

    let config = test_config("auth-fail", &addr.ip().to_string(), addr.port());
    let audit_file = config.audit.path.clone();
    let router = http::router(build_state(&config));

    let response = router
        .oneshot(command_request(
            Some("tok_admin"),
            json!({ "command": "list" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "authentication_failed");
    assert_eq!(body["success"], false);

    let _ = tokio::fs::remove_file(&audit_file).await;
}

#[tokio::test]
async fn unreachable_server_maps_to_bad_gateway() {
    // Nothing listens on the port after the listener is dropped.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = test_config("refused", &addr.ip().to_string(), addr.port());
    let audit_file = config.audit.path.clone();
    let router = http::router(build_state(&config));

    let started = std::time::Instant::now();
    let response = router
        .oneshot(command_request(
            Some("tok_admin"),
            json!({ "command": "list" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["code"], "connection_error");
    assert!(started.elapsed() < Duration::from_secs(5));

    let _ = tokio::fs::remove_file(&audit_file).await;
}
