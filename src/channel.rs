//! Host channel handling.
//!
//! One socket connection corresponds to one session context. The read loop
//! takes one decoded frame at a time and processes a user turn to
//! completion — including any awaited collaborator calls — before asking
//! the codec for the next already-buffered frame, so frames are handled
//! strictly in arrival order and no two turns interleave. Outbound replies
//! flow through an [`mpsc`] channel drained by a spawned writer task.

use std::path::Path;

use futures_util::{SinkExt, StreamExt};
use interprocess::local_socket::tokio::prelude::*;
use interprocess::local_socket::tokio::Stream;
use interprocess::local_socket::GenericFilePath;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clients::{MemoryStore, StatusBackend};
use crate::dialog::engine::DialogEngine;
use crate::protocol::codec::FrameCodec;
use crate::protocol::frame::{Frame, EVENT_CLIENT_TERMINATE, EVENT_USER_MESSAGE};
use crate::protocol::message::InboundMessage;
use crate::{AppError, Result};

/// Connect to the host orchestrator's socket at `path`.
///
/// # Errors
///
/// Returns [`AppError::Channel`] if the path is not a valid socket name or
/// the connection is refused.
pub async fn connect_host(path: &Path) -> Result<Stream> {
    let name = path
        .to_fs_name::<GenericFilePath>()
        .map_err(|err| AppError::Channel(format!("invalid socket path {}: {err}", path.display())))?;
    Stream::connect(name)
        .await
        .map_err(|err| AppError::Channel(format!("connect to {} failed: {err}", path.display())))
}

/// Drive one session over the given byte-stream halves until the host
/// terminates it, the stream ends, or a fatal framing error occurs.
///
/// The engine must have been built with the sender side of `reply_rx`.
///
/// # Errors
///
/// Returns [`AppError::Framing`] when the inbound stream is corrupt and
/// [`AppError::Channel`] when replies can no longer be written.
pub async fn run_session<R, W, M, S>(
    reader: R,
    writer: W,
    mut engine: DialogEngine<M, S>,
    reply_rx: mpsc::Receiver<Frame>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
    M: MemoryStore,
    S: StatusBackend,
{
    let cancel = CancellationToken::new();
    let writer_handle = tokio::spawn(run_writer(writer, reply_rx, cancel.clone()));

    let mut frames = FramedRead::new(reader, FrameCodec::new());
    let result = loop {
        let Some(next) = frames.next().await else {
            info!("host closed the channel");
            break Ok(());
        };
        match next {
            Ok(frame) => match frame.event_type {
                EVENT_USER_MESSAGE => match serde_json::from_value::<InboundMessage>(frame.body) {
                    Ok(turn) => {
                        if let Err(err) = engine.handle_user_turn(&turn).await {
                            break Err(err);
                        }
                    }
                    Err(err) => {
                        warn!(%err, "user turn body missing required fields; skipping");
                    }
                },
                EVENT_CLIENT_TERMINATE => {
                    // Any in-flight work for a prior turn is abandoned.
                    info!("termination frame received; closing channel");
                    break Ok(());
                }
                other => {
                    warn!(event_type = other, "unknown inbound event type; skipping");
                }
            },
            Err(err) => {
                error!(%err, "fatal framing error; closing channel");
                break Err(err);
            }
        }
    };

    cancel.cancel();
    if let Err(err) = writer_handle.await {
        warn!(%err, "writer task join failed");
    }
    result
}

/// Writer task: serialise queued reply frames onto the socket.
///
/// Exits when cancelled or when every reply sender has been dropped.
async fn run_writer<W>(
    writer: W,
    mut reply_rx: mpsc::Receiver<Frame>,
    cancel: CancellationToken,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut framed = FramedWrite::new(writer, FrameCodec::new());
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => {
                debug!("writer task cancelled");
                break;
            }
            maybe_frame = reply_rx.recv() => {
                let Some(frame) = maybe_frame else {
                    debug!("reply channel drained and closed");
                    break;
                };
                framed.send(frame).await?;
            }
        }
    }
    framed.flush().await?;
    Ok(())
}
