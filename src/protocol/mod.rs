//! Host orchestrator wire protocol.
//!
//! The host speaks length-prefixed binary frames over a local socket: a
//! fixed 16-byte big-endian header followed by a UTF-8 JSON body.
//!
//! Submodules:
//! - `frame`: header layout, event-type constants, pure encode/decode.
//! - `codec`: [`FrameCodec`](codec::FrameCodec) stream reassembler for
//!   [`tokio_util::codec::FramedRead`] / [`tokio_util::codec::FramedWrite`].
//! - `message`: serde payload types carried in frame bodies.

pub mod codec;
pub mod frame;
pub mod message;
