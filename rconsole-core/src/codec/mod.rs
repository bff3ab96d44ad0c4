//! Length-prefixed framing for RCON packets over a byte stream.
//!
//! The transport is a TCP stream, not a datagram socket: a frame may
//! arrive one byte at a time or glued to its neighbours. The decoder
//! buffers until the declared length is satisfied, so short reads are
//! handled by construction.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::trace;

use crate::error::RconError;
use crate::packet::{MAX_RESPONSE_FRAME, MIN_FRAME_LEN, Packet};

/// Codec for [`Packet`] frames via `tokio_util::codec::Framed`.
#[derive(Debug, Clone)]
pub struct RconCodec {
    max_frame: usize,
}

impl RconCodec {
    /// Client-side codec with the response-side frame allowance.
    pub fn client() -> Self {
        Self::with_max_frame(MAX_RESPONSE_FRAME)
    }

    /// Codec with an explicit frame guard.
    pub fn with_max_frame(max_frame: usize) -> Self {
        Self { max_frame }
    }
}

impl Default for RconCodec {
    fn default() -> Self {
        Self::client()
    }
}

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = RconError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, RconError> {
        if src.len() < 4 {
            return Ok(None);
        }

        let mut word = [0u8; 4];
        word.copy_from_slice(&src[0..4]);
        let declared = i32::from_le_bytes(word);

        if declared < MIN_FRAME_LEN as i32 {
            return Err(RconError::MalformedPacket(format!(
                "declared length {declared} below protocol minimum {MIN_FRAME_LEN}"
            )));
        }
        let frame_len = declared as usize;
        if frame_len > self.max_frame {
            return Err(RconError::MalformedPacket(format!(
                "declared length {frame_len} exceeds limit {}",
                self.max_frame
            )));
        }

        if src.len() < 4 + frame_len {
            // Wait for the remainder of the frame.
            src.reserve(4 + frame_len - src.len());
            return Ok(None);
        }

        src.advance(4);
        let frame = src.split_to(frame_len);
        let packet = Packet::from_frame(&frame)?;
        trace!(id = packet.id(), ptype = packet.ptype(), bytes = frame_len, "decoded packet");
        Ok(Some(packet))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, RconError> {
        match self.decode(src)? {
            Some(packet) => Ok(Some(packet)),
            None if src.is_empty() => Ok(None),
            None => Err(RconError::MalformedPacket(
                "stream closed mid-frame".into(),
            )),
        }
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = RconError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), RconError> {
        trace!(id = item.id(), ptype = item.ptype(), "encoding packet");
        dst.extend_from_slice(&item.to_wire());
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────
