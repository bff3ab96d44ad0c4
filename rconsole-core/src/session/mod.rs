//! Managed TCP session speaking the RCON protocol.
//!
//! # Wire Sequence
//!
//! ```text
//! Client ──[SERVERDATA_AUTH, id=n, password]──────────► Server
//! Server ──[SERVERDATA_RESPONSE_VALUE, empty]─────────► Client   (some servers)
//! Server ──[SERVERDATA_AUTH_RESPONSE, id=n | id=-1]───► Client
//!
//! Client ──[SERVERDATA_EXECCOMMAND, id=c, command]────► Server
//! Client ──[SERVERDATA_EXECCOMMAND, id=p, empty]──────► Server   (probe)
//! Server ──[SERVERDATA_RESPONSE_VALUE, id=c, chunk]───► Client   (repeated)
//! Server ──[SERVERDATA_RESPONSE_VALUE, id=p]──────────► Client   (end marker)
//! ```
//!
//! Long command output is split across several `RESPONSE_VALUE` frames
//! with the command's id. The protocol has no explicit last-packet
//! marker, so the session sends an empty probe right after the command
//! and stops concatenating when the probe's echo arrives.
//!
//! A session exclusively owns its TCP connection for the lifetime of
//! one execution; dropping it releases the socket, and [`Session::close`]
//! does so gracefully from any phase.

use std::io;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::RconCodec;
use crate::config::SessionTimeouts;
use crate::error::RconError;
use crate::packet::Packet;

pub mod phase;

pub use phase::SessionPhase;

/// The id issued after `id` wrapped; negative and zero ids are never
/// handed out, so `-1` can only ever mean a rejected authentication.
fn next_after(id: i32) -> i32 {
    if id == i32::MAX { 1 } else { id + 1 }
}

/// One authenticated conversation with one RCON endpoint.
#[derive(Debug)]
pub struct Session {
    framed: Framed<TcpStream, RconCodec>,
    phase: SessionPhase,
    next_id: i32,
    io_timeout: Duration,
}

impl Session {
    /// Open a TCP connection to `host:port`, bounded by the connect
    /// timeout. The returned session is in the `Authenticating` phase.
    pub async fn connect(
        host: &str,
        port: u16,
        timeouts: SessionTimeouts,
    ) -> Result<Self, RconError> {
        let addr = format!("{host}:{port}");
        let dialed = tokio::time::timeout(timeouts.connect, TcpStream::connect(&addr)).await;
        let stream = match dialed {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(RconError::Connection(e)),
            Err(_) => {
                return Err(RconError::Connection(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {addr} timed out"),
                )));
            }
        };
        debug!(target: "rconsole::session", %addr, "connected");

        let mut phase = SessionPhase::default();
        phase.begin_auth()?;

        Ok(Self {
            framed: Framed::new(stream, RconCodec::client()),
            phase,
            next_id: 1,
            io_timeout: timeouts.io,
        })
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    fn next_request_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id = next_after(id);
        id
    }

    async fn send_packet(&mut self, packet: Packet) -> Result<(), RconError> {
        let sent = tokio::time::timeout(self.io_timeout, self.framed.send(packet)).await;
        match sent {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => {
                self.phase.fail();
                Err(e)
            }
            Err(_) => {
                self.phase.fail();
                Err(RconError::Timeout(self.io_timeout))
            }
        }
    }

    async fn recv_packet(&mut self) -> Result<Packet, RconError> {
        let received = tokio::time::timeout(self.io_timeout, self.framed.next()).await;
        match received {
            Ok(Some(Ok(packet))) => Ok(packet),
            Ok(Some(Err(e))) => {
                self.phase.fail();
                Err(e)
            }
            Ok(None) => {
                self.phase.fail();
                Err(RconError::Connection(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "server closed the connection",
                )))
            }
            Err(_) => {
                self.phase.fail();
                Err(RconError::Timeout(self.io_timeout))
            }
        }
    }

    /// Perform the password handshake. One attempt, no retry.
    ///
    /// Keeps reading until the server either acknowledges the sent id
    /// (→ `Ready`), answers with id `-1` (→ `AuthenticationFailed`), or
    /// the stream closes or times out.
    pub async fn authenticate(&mut self, password: &str) -> Result<(), RconError> {
        if self.phase != SessionPhase::Authenticating {
            return Err(RconError::ProtocolViolation(
                "authenticate requires the Authenticating phase",
            ));
        }

        let id = self.next_request_id();
        let request = Packet::auth(id, password)?;
        self.send_packet(request).await?;

        loop {
            let packet = self.recv_packet().await?;
            if packet.is_auth_failure() {
                self.phase.fail();
                warn!(target: "rconsole::session", "authentication rejected by server");
                return Err(RconError::AuthenticationFailed);
            }
            if packet.is_auth_response() && packet.id() == id {
                self.phase.complete_auth()?;
                debug!(target: "rconsole::session", "authenticated");
                return Ok(());
            }
            // Some server implementations echo an empty RESPONSE_VALUE
            // before the real auth response.
            debug!(
                target: "rconsole::session",
                id = packet.id(),
                ptype = packet.ptype(),
                "skipping packet while authenticating"
            );
        }
    }

    /// Execute one command and return its reassembled output.
    ///
    /// Only callable from `Ready`. Sends the command followed by an
    /// empty probe packet; response bodies carrying the command id are
    /// concatenated until the probe's echo arrives.
    pub async fn execute(&mut self, command: &str) -> Result<String, RconError> {
        self.phase.begin_execute()?;

        let command_id = self.next_request_id();
        let probe_id = self.next_request_id();
        let request = match Packet::exec(command_id, command) {
            Ok(packet) => packet,
            Err(e) => {
                // Nothing went out; the session is still usable.
                self.phase.complete_execute()?;
                return Err(e);
            }
        };

        self.send_packet(request).await?;
        self.send_packet(Packet::exec_probe(probe_id)).await?;

        let mut output = String::new();
        loop {
            let packet = self.recv_packet().await?;
            if packet.id() == probe_id {
                break;
            }
            if packet.id() == command_id && packet.is_response_value() {
                output.push_str(packet.body());
            } else {
                debug!(
                    target: "rconsole::session",
                    id = packet.id(),
                    "skipping packet with unrelated id"
                );
            }
        }

        self.phase.complete_execute()?;
        debug!(
            target: "rconsole::session",
            bytes = output.len(),
            "command executed"
        );
        Ok(output)
    }

    /// Release the connection. Idempotent; safe in any phase.
    ///
    /// Flushes pending frames and sends FIN on a best-effort basis —
    /// the socket itself is released even if the peer is gone.
    pub async fn close(&mut self) {
        if self.phase.is_closed() {
            return;
        }
        let _ = tokio::time::timeout(self.io_timeout, self.framed.close()).await;
        self.phase.close();
        debug!(target: "rconsole::session", "session closed");
    }
}
