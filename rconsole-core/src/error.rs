//! Domain-specific error types for remote command execution.
//!
//! All fallible operations return `Result<T, RconError>`.
//! No panics on invalid input — every error is typed and recoverable.

use std::time::Duration;
use thiserror::Error;

/// The canonical error type for the RCON execution core.
///
/// Every variant is terminal for the current request: nothing in this
/// crate retries automatically. Retry policy, if any, belongs to the
/// caller.
#[derive(Debug, Error)]
pub enum RconError {
    // ── Authorization ────────────────────────────────────────────
    /// The caller lacks the privilege required for remote execution.
    /// Raised strictly before any credential or network activity.
    #[error("caller is not authorized for remote command execution")]
    Unauthorized,

    // ── Target resolution ────────────────────────────────────────
    /// The named server does not exist in the registry.
    #[error("server '{0}' is not registered")]
    ServerNotFound(String),

    /// The target exists but is disabled; disabled targets are never
    /// dialed, regardless of network reachability.
    #[error("server '{0}' is disabled")]
    ServerInactive(String),

    /// The secret provider could not produce a plaintext credential.
    #[error("credential resolution failed: {0}")]
    CredentialUnavailable(String),

    // ── Transport ────────────────────────────────────────────────
    /// The TCP/IO layer reported an error (refusal, reset, DNS
    /// failure, stream closed mid-conversation).
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// An operation exceeded its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    // ── Protocol ─────────────────────────────────────────────────
    /// The remote server rejected the RCON password (response id -1).
    #[error("authentication rejected by the remote server")]
    AuthenticationFailed,

    /// A frame on the wire violated the RCON packet format.
    #[error("malformed packet: {0}")]
    MalformedPacket(String),

    /// The command text was rejected before any network activity.
    #[error("invalid command: {0}")]
    InvalidCommand(&'static str),

    /// A session was driven through an invalid phase transition.
    /// Guards programming errors; a correct caller never sees this.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),
}

impl RconError {
    /// Stable snake_case token for this error's category.
    ///
    /// Audit records and the admin API carry this token so failures can
    /// be filtered without parsing display strings.
    pub fn category(&self) -> &'static str {
        match self {
            RconError::Unauthorized => "unauthorized",
            RconError::ServerNotFound(_) => "server_not_found",
            RconError::ServerInactive(_) => "server_inactive",
            RconError::CredentialUnavailable(_) => "credential_unavailable",
            RconError::Connection(_) => "connection_error",
            RconError::Timeout(_) => "timeout",
            RconError::AuthenticationFailed => "authentication_failed",
            RconError::MalformedPacket(_) => "malformed_packet",
            RconError::InvalidCommand(_) => "invalid_command",
            RconError::ProtocolViolation(_) => "protocol_violation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = RconError::ServerNotFound("main".into());
        assert!(e.to_string().contains("main"));

        let e = RconError::Timeout(Duration::from_secs(5));
        assert!(e.to_string().contains("5s"));

        let e = RconError::InvalidCommand("command is empty");
        assert!(e.to_string().contains("empty"));
    }

    #[test]
    fn from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let e: RconError = io_err.into();
        assert!(matches!(e, RconError::Connection(_)));
        assert_eq!(e.category(), "connection_error");
    }

    #[test]
    fn categories_are_stable() {
        assert_eq!(RconError::Unauthorized.category(), "unauthorized");
        assert_eq!(RconError::AuthenticationFailed.category(), "authentication_failed");
        assert_eq!(
            RconError::MalformedPacket("frame too short".into()).category(),
            "malformed_packet"
        );
        assert_eq!(
            RconError::ServerInactive("main".into()).category(),
            "server_inactive"
        );
    }
}
