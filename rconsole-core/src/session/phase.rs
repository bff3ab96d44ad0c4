//! Transport session state machine.
//!
//! Provides a `SessionPhase` enum that models the lifecycle of one RCON
//! session, with validated transitions that return `Result` instead of
//! panicking.

use crate::error::RconError;

// ── SessionPhase ─────────────────────────────────────────────────

/// The current phase of an RCON transport session.
///
/// ```text
///  Connecting ──► Authenticating ──► Ready ◄──► Executing
///       │                │             │            │
///       └────────────────┴─────┬───────┴────────────┘
///                              ▼
///                      Failed / Closed
/// ```
///
/// `Closed` and `Failed` are terminal. `Failed` is reachable from any
/// non-`Closed` phase; `close` is valid (and idempotent) everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// TCP connection initiated but not yet established.
    #[default]
    Connecting,

    /// TCP link is up; the password handshake is pending or in flight.
    Authenticating,

    /// Handshake accepted; the session may execute commands.
    Ready,

    /// A command round-trip is in flight.
    Executing,

    /// The socket has been released. Terminal.
    Closed,

    /// An unrecoverable protocol or transport error occurred. Terminal.
    Failed,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "Connecting"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::Ready => write!(f, "Ready"),
            Self::Executing => write!(f, "Executing"),
            Self::Closed => write!(f, "Closed"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}

impl SessionPhase {
    /// Returns `true` when the session may execute a command.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` when the session has released its socket.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Returns `true` when the session hit an unrecoverable error.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns `true` for either terminal phase.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }

    // ── Transitions ──────────────────────────────────────────────

    /// Transition to `Authenticating`.
    ///
    /// Valid from: `Connecting`.
    pub fn begin_auth(&mut self) -> Result<(), RconError> {
        match self {
            Self::Connecting => {
                *self = Self::Authenticating;
                Ok(())
            }
            _ => Err(RconError::ProtocolViolation(
                "cannot authenticate: not in Connecting phase",
            )),
        }
    }

    /// Transition to `Ready`.
    ///
    /// Valid from: `Authenticating`.
    pub fn complete_auth(&mut self) -> Result<(), RconError> {
        match self {
            Self::Authenticating => {
                *self = Self::Ready;
                Ok(())
            }
            _ => Err(RconError::ProtocolViolation(
                "cannot complete handshake: not in Authenticating phase",
            )),
        }
    }

    /// Transition to `Executing`.
    ///
    /// Valid from: `Ready`.
    pub fn begin_execute(&mut self) -> Result<(), RconError> {
        match self {
            Self::Ready => {
                *self = Self::Executing;
                Ok(())
            }
            _ => Err(RconError::ProtocolViolation(
                "cannot execute: session is not Ready",
            )),
        }
    }

    /// Transition back to `Ready` after a completed command.
    ///
    /// Valid from: `Executing`.
    pub fn complete_execute(&mut self) -> Result<(), RconError> {
        match self {
            Self::Executing => {
                *self = Self::Ready;
                Ok(())
            }
            _ => Err(RconError::ProtocolViolation(
                "cannot complete execution: no command in flight",
            )),
        }
    }

    /// Force the session into `Failed`.
    ///
    /// Valid from any phase; a no-op once `Closed` (the socket is gone,
    /// there is nothing left to fail).
    pub fn fail(&mut self) {
        if !matches!(self, Self::Closed) {
            *self = Self::Failed;
        }
    }

    /// Transition to `Closed`. Valid from any phase; idempotent.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }
}

// ── Tests ────────────────────────────────────────────────────────
