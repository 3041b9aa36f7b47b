//! Stream reassembler for the host frame protocol.
//!
//! Wraps the byte-accumulation loop in a [`tokio_util::codec::Decoder`] /
//! [`tokio_util::codec::Encoder`] pair so the channel can use
//! [`tokio_util::codec::FramedRead`] and [`tokio_util::codec::FramedWrite`]
//! directly. One chunk delivery may contain several frames or a fraction of
//! one; frames are yielded strictly in arrival order.
//!
//! Error asymmetry, intentional: a magic mismatch (or an oversized body
//! length) is unrecoverable — byte alignment is lost, the decode returns
//! [`AppError::Framing`] and the channel must close. A frame whose body is
//! not valid JSON is an isolated, skippable unit: it is logged and dropped,
//! and decoding continues with the next frame in the buffer.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::protocol::frame::{
    decode_header, encode_frame, Frame, HEADER_LEN, MAGIC, MAX_BODY_BYTES,
};
use crate::{AppError, Result};

/// Codec reassembling complete [`Frame`]s from an arbitrarily-chunked
/// byte stream and encoding outbound frames.
#[derive(Debug, Default)]
pub struct FrameCodec;

impl FrameCodec {
    /// Create a new `FrameCodec`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = AppError;

    /// Carve the next complete frame out of `src`.
    ///
    /// Returns `Ok(None)` when fewer than a full header-plus-body is
    /// buffered (the only suspension point). Skips frames whose body fails
    /// to parse as JSON and keeps carving.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Framing`] on a magic mismatch or a body length
    /// above [`MAX_BODY_BYTES`]; both are fatal for the stream.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        loop {
            if src.len() < HEADER_LEN {
                return Ok(None);
            }

            // Peek at the header without consuming it yet.
            let header = decode_header(&src[..HEADER_LEN])?;
            if header.magic != MAGIC {
                return Err(AppError::Framing(format!(
                    "invalid magic number {:#010x}",
                    header.magic
                )));
            }
            if header.body_length > MAX_BODY_BYTES {
                return Err(AppError::Framing(format!(
                    "body length {} exceeds limit of {MAX_BODY_BYTES} bytes",
                    header.body_length
                )));
            }

            let total = HEADER_LEN + header.body_length as usize;
            if src.len() < total {
                src.reserve(total - src.len());
                return Ok(None);
            }

            src.advance(HEADER_LEN);
            let body_bytes = src.split_to(header.body_length as usize);

            match serde_json::from_slice::<serde_json::Value>(&body_bytes) {
                Ok(body) => {
                    return Ok(Some(Frame {
                        event_type: header.event_type,
                        body,
                    }));
                }
                Err(err) => {
                    // Recoverable: drop this frame, continue with the next.
                    warn!(
                        event_type = header.event_type,
                        %err,
                        "dropping frame with malformed json body"
                    );
                }
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = AppError;

    /// Encode `item` as header-plus-JSON-body into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Channel`] if the body fails to serialize.
    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<()> {
        let encoded = encode_frame(item.event_type, &item.body)?;
        dst.extend_from_slice(&encoded);
        Ok(())
    }
}
