//! # rconsole-core
//!
//! Remote-console execution core for the storefront's game servers: a
//! protocol-correct client for the Source-RCON protocol plus the
//! execution-control layers around it.
//!
//! This crate contains:
//! - **Packet**: the RCON wire frame with little-endian framing rules
//! - **Codec**: `RconCodec` for framed TCP I/O via `tokio_util`
//! - **Session**: one managed TCP conversation — handshake, command
//!   round-trips with multi-frame reassembly, scoped socket release
//! - **Executor**: `connect → authenticate → execute → close` per call
//! - **Gate**: admin-role authorization ahead of any secret or socket
//! - **Audit**: append-only trail of every credential access and
//!   execution attempt
//! - **Service**: the privileged `executeCommand` operation tying the
//!   above together
//! - **Error**: `RconError` — typed, `thiserror`-based error hierarchy
//!
//! External collaborators (role lookup, server registry, secret
//! resolution, audit storage) are traits; deployments wire their own.

pub mod audit;
pub mod codec;
pub mod config;
pub mod error;
pub mod executor;
pub mod gate;
pub mod packet;
pub mod service;
pub mod session;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use audit::{AccessKind, AuditEntry, AuditRecorder, AuditSink};
pub use codec::RconCodec;
pub use config::{ExecutionRequest, ServerConfig, SessionTimeouts};
pub use error::RconError;
pub use executor::{CommandExecutor, Connector, TcpConnector};
pub use gate::{ADMIN_ROLE, AccessGate, AdminProof, CallerIdentity, RoleProvider};
pub use packet::Packet;
pub use service::{CommandReceipt, CommandService, Secret, SecretProvider, ServerRegistry};
pub use session::{Session, SessionPhase};
