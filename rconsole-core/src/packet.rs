//! The Source-RCON wire packet.
//!
//! # Wire Format
//!
//! ```text
//! ┌────────────┬────────────┬────────────┬─────────────┬──────────┐
//! │ length i32 │   id i32   │  type i32  │  body UTF-8 │ 0x00 0x00│
//! └────────────┴────────────┴────────────┴─────────────┴──────────┘
//!   little-endian throughout; `length` counts id + type + body +
//!   terminator and excludes the length field itself.
//! ```
//!
//! The protocol assigns the numeric value 2 to both the execute-command
//! request and the auth response, so the raw `type` value alone does not
//! identify a packet — classification is by handshake phase and request
//! id. `Packet` therefore stores the raw wire value instead of an enum.

use std::fmt::Debug;

use crate::error::RconError;

// ── Wire type values ─────────────────────────────────────────────

/// Authentication request (client → server).
pub const SERVERDATA_AUTH: i32 = 3;
/// Authentication response (server → client). Shares the value 2 with
/// [`SERVERDATA_EXECCOMMAND`]; direction and phase disambiguate.
pub const SERVERDATA_AUTH_RESPONSE: i32 = 2;
/// Command execution request (client → server).
pub const SERVERDATA_EXECCOMMAND: i32 = 2;
/// Command output (server → client).
pub const SERVERDATA_RESPONSE_VALUE: i32 = 0;

/// The id a server echoes on a failed authentication response.
pub const AUTH_FAILED_ID: i32 = -1;

// ── Frame size bounds ────────────────────────────────────────────

/// Every body is closed by two NUL bytes on the wire.
const BODY_TERMINATOR: [u8; 2] = [0, 0];

/// The id and type fields preceding the body inside a frame.
const FRAME_HEADER_LEN: usize = 8;

/// Smallest legal frame: id + type + empty body + terminator.
pub const MIN_FRAME_LEN: usize = FRAME_HEADER_LEN + BODY_TERMINATOR.len();

/// Request-side frame guard. Commands are operator-typed text; anything
/// near this bound is garbage or abuse.
pub const MAX_REQUEST_FRAME: usize = 64 * 1024;

/// Response-side frame guard. Long command output arrives split across
/// multiple frames and is reassembled above the codec, so no single
/// legitimate frame approaches this.
pub const MAX_RESPONSE_FRAME: usize = 1024 * 1024;

// ── Packet ───────────────────────────────────────────────────────

/// One RCON frame: correlation id, raw wire type, and UTF-8 body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    id: i32,
    ptype: i32,
    body: String,
}

impl Packet {
    fn new(id: i32, ptype: i32, body: impl Into<String>, max_frame: usize) -> Result<Self, RconError> {
        let body = body.into();
        if body.contains('\0') {
            return Err(RconError::InvalidCommand("embedded NUL byte"));
        }
        let packet = Self { id, ptype, body };
        if packet.frame_len() > max_frame {
            return Err(RconError::InvalidCommand("body exceeds maximum frame size"));
        }
        Ok(packet)
    }

    /// An authentication request carrying the plaintext password.
    pub fn auth(id: i32, password: &str) -> Result<Self, RconError> {
        Self::new(id, SERVERDATA_AUTH, password, MAX_REQUEST_FRAME)
    }

    /// A command execution request.
    pub fn exec(id: i32, command: &str) -> Result<Self, RconError> {
        Self::new(id, SERVERDATA_EXECCOMMAND, command, MAX_REQUEST_FRAME)
    }

    /// The empty-body probe sent after a command. The server echoes a
    /// response for it, which marks the end of the command's output.
    pub fn exec_probe(id: i32) -> Self {
        Self {
            id,
            ptype: SERVERDATA_EXECCOMMAND,
            body: String::new(),
        }
    }

    /// A command output frame (server side; used by test fixtures).
    pub fn response(id: i32, body: impl Into<String>) -> Result<Self, RconError> {
        Self::new(id, SERVERDATA_RESPONSE_VALUE, body, MAX_RESPONSE_FRAME)
    }

    /// An authentication response frame (server side; used by test
    /// fixtures). Pass [`AUTH_FAILED_ID`] to signal a rejected password.
    pub fn auth_response(id: i32) -> Self {
        Self {
            id,
            ptype: SERVERDATA_AUTH_RESPONSE,
            body: String::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────

    pub fn id(&self) -> i32 {
        self.id
    }

    /// The raw wire value of the type field.
    pub fn ptype(&self) -> i32 {
        self.ptype
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// `true` for a server auth response. Only meaningful for packets
    /// received during the handshake phase — the same wire value means
    /// "execute command" in the client → server direction.
    pub fn is_auth_response(&self) -> bool {
        self.ptype == SERVERDATA_AUTH_RESPONSE
    }

    /// `true` for a command output frame.
    pub fn is_response_value(&self) -> bool {
        self.ptype == SERVERDATA_RESPONSE_VALUE
    }

    /// `true` when the server signalled a rejected password.
    pub fn is_auth_failure(&self) -> bool {
        self.id == AUTH_FAILED_ID
    }

    // ── Encoding ─────────────────────────────────────────────────

    /// The value of the wire `length` field: id + type + body +
    /// terminator, excluding the length field itself.
    pub fn frame_len(&self) -> usize {
        FRAME_HEADER_LEN + self.body.len() + BODY_TERMINATOR.len()
    }

    /// Encode the full wire representation, length prefix included.
    pub fn to_wire(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(4 + self.frame_len());
        buf.extend_from_slice(&(self.frame_len() as i32).to_le_bytes());
        buf.extend_from_slice(&self.id.to_le_bytes());
        buf.extend_from_slice(&self.ptype.to_le_bytes());
        buf.extend_from_slice(self.body.as_bytes());
        buf.extend_from_slice(&BODY_TERMINATOR);
        buf
    }

    /// Parse a frame whose length prefix has already been consumed.
    ///
    /// The caller (the codec) guarantees that `frame` holds exactly the
    /// number of bytes the length field declared; everything else is
    /// validated here.
    pub fn from_frame(frame: &[u8]) -> Result<Self, RconError> {
        if frame.len() < MIN_FRAME_LEN {
            return Err(RconError::MalformedPacket(format!(
                "frame too short: {} bytes (minimum {MIN_FRAME_LEN})",
                frame.len()
            )));
        }

        let mut word = [0u8; 4];
        word.copy_from_slice(&frame[0..4]);
        let id = i32::from_le_bytes(word);
        word.copy_from_slice(&frame[4..8]);
        let ptype = i32::from_le_bytes(word);

        let (body_bytes, terminator) = frame[FRAME_HEADER_LEN..].split_at(frame.len() - FRAME_HEADER_LEN - BODY_TERMINATOR.len());
        if terminator != BODY_TERMINATOR {
            return Err(RconError::MalformedPacket(
                "missing NUL terminator".into(),
            ));
        }

        let body = String::from_utf8(body_bytes.to_vec())
            .map_err(|_| RconError::MalformedPacket("body is not valid UTF-8".into()))?;

        Ok(Self { id, ptype, body })
    }
}

// ── Tests ────────────────────────────────────────────────────────
