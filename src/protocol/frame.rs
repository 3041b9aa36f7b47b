//! Frame header layout and pure encode/decode operations.
//!
//! Wire format (all integers big-endian):
//!
//! ```text
//! offset  size  field
//!      0     4  magic       = 0xDEADBEEF
//!      4     2  version     = 1
//!      6     2  event_type
//!      8     4  body_length
//!     12     4  reserved    = 0
//!     16     n  body        (UTF-8 JSON, exactly body_length bytes)
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{AppError, Result};

/// Fixed sentinel opening every frame. Any other value invalidates the stream.
pub const MAGIC: u32 = 0xDEAD_BEEF;

/// Wire protocol version written into every outbound header.
pub const PROTOCOL_VERSION: u16 = 1;

/// Size of the fixed frame header in bytes.
pub const HEADER_LEN: usize = 16;

/// Maximum accepted body length: 1 MiB.
///
/// A header advertising a larger body is treated as a framing violation,
/// protecting the process from allocating unbounded memory for a single
/// frame from a misbehaving host.
pub const MAX_BODY_BYTES: u32 = 1_048_576;

/// Inbound user turn.
pub const EVENT_USER_MESSAGE: u16 = 1001;
/// Inbound session termination.
pub const EVENT_CLIENT_TERMINATE: u16 = 1002;
/// Outbound agent reply.
pub const EVENT_SERVER_MESSAGE: u16 = 2001;
/// Outbound end-of-turn signal.
pub const EVENT_TOOL_FINISH: u16 = 2002;
/// Memory store action carried over the host HTTP interface.
pub const EVENT_MEMORY_ACTION: u16 = 3000;

/// Decoded fixed-size frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Sentinel value; must equal [`MAGIC`].
    pub magic: u32,
    /// Protocol version.
    pub version: u16,
    /// Message purpose discriminator.
    pub event_type: u16,
    /// Byte length of the JSON body following the header.
    pub body_length: u32,
}

/// One complete protocol message: event type plus parsed JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Message purpose discriminator.
    pub event_type: u16,
    /// Parsed JSON body.
    pub body: serde_json::Value,
}

/// Decode a 16-byte header slice. Pure; no side effects.
///
/// The reserved trailing word is ignored on read.
///
/// # Errors
///
/// Returns [`AppError::Framing`] if `bytes` is not exactly [`HEADER_LEN`]
/// bytes long. Magic validation is left to the caller, which knows whether
/// a mismatch is fatal in its context.
pub fn decode_header(bytes: &[u8]) -> Result<FrameHeader> {
    if bytes.len() != HEADER_LEN {
        return Err(AppError::Framing(format!(
            "header must be exactly {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let mut buf = bytes;
    Ok(FrameHeader {
        magic: buf.get_u32(),
        version: buf.get_u16(),
        event_type: buf.get_u16(),
        body_length: buf.get_u32(),
    })
}

/// Encode a payload into a complete wire frame.
///
/// Serializes `payload` to UTF-8 JSON, prepends the 16-byte header with
/// [`MAGIC`], [`PROTOCOL_VERSION`], `event_type`, the body length, and a
/// zero reserved word.
///
/// # Errors
///
/// Returns [`AppError::Channel`] if the payload fails to serialize, which
/// cannot occur for an already-parsed [`serde_json::Value`].
pub fn encode_frame(event_type: u16, payload: &serde_json::Value) -> Result<Bytes> {
    let body = serde_json::to_vec(payload)?;
    let mut buf = BytesMut::with_capacity(HEADER_LEN + body.len());
    buf.put_u32(MAGIC);
    buf.put_u16(PROTOCOL_VERSION);
    buf.put_u16(event_type);
    buf.put_u32(u32::try_from(body.len()).map_err(|_| {
        AppError::Framing(format!("body length {} exceeds u32 range", body.len()))
    })?);
    buf.put_u32(0); // reserved
    buf.put_slice(&body);
    Ok(buf.freeze())
}
