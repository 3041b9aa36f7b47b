//! End-to-end session tests: framed bytes in, framed replies out.
//!
//! Drives `run_session` over an in-memory duplex stream with the real
//! HTTP clients pointed at a local axum test backend.

use axum::routing::get;
use axum::{Json, Router};
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio::io::{duplex, split, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio_util::codec::FramedRead;

use auto_status_skill::channel::run_session;
use auto_status_skill::clients::memory::MemoryClient;
use auto_status_skill::clients::status::StatusClient;
use auto_status_skill::dialog::engine::DialogEngine;
use auto_status_skill::protocol::codec::FrameCodec;
use auto_status_skill::protocol::frame::{
    encode_frame, Frame, EVENT_CLIENT_TERMINATE, EVENT_SERVER_MESSAGE, EVENT_USER_MESSAGE,
};
use auto_status_skill::AppError;

fn user_turn_bytes(content: &str) -> Vec<u8> {
    let payload = json!({
        "event_type": 1001,
        "dialog_id": "d-1",
        "user_id": "u-1",
        "messages": { "content": content, "attachments": [] }
    });
    encode_frame(EVENT_USER_MESSAGE, &payload)
        .expect("encode must succeed")
        .to_vec()
}

fn terminate_bytes() -> Vec<u8> {
    let payload = json!({ "event_type": 1002, "dialog_id": "d-1", "user_id": "u-1" });
    encode_frame(EVENT_CLIENT_TERMINATE, &payload)
        .expect("encode must succeed")
        .to_vec()
}

/// Spawn a status backend whose release-repo path answers with a healthy
/// build; returns a repo URL that the slot extractor accepts.
async fn spawn_status_backend() -> String {
    async fn handler() -> Json<Value> {
        Json(json!({
            "error_code": 0,
            "data": {
                "auto名称": "test-auto",
                "buildee名称": "test-buildee",
                "auto启动时间": "2025-08-19 10:00:00",
                "健康状况": "healthy",
                "健康持续时长": "1 hour",
                "健康开始时间": "2025-08-19 09:00:00",
            }
        }))
    }

    let app = Router::new().route(
        "/playcube.release.git/build/get_auto_info/{tag}",
        get(handler),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port must bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://127.0.0.1:{port}/playcube.release.git")
}

type SessionHandle = tokio::task::JoinHandle<auto_status_skill::Result<()>>;

/// Wire up a session over a duplex stream; returns the host-side write
/// half, a framed reader of skill replies, and the session task handle.
fn spawn_session(
    host_buffer: usize,
) -> (
    tokio::io::WriteHalf<tokio::io::DuplexStream>,
    FramedRead<tokio::io::ReadHalf<tokio::io::DuplexStream>, FrameCodec>,
    SessionHandle,
) {
    let (host_io, skill_io) = duplex(host_buffer);
    let (skill_read, skill_write) = split(skill_io);
    let (host_read, host_write) = split(host_io);

    let (reply_tx, reply_rx) = mpsc::channel(32);
    let memory = MemoryClient::new(None);
    let status = StatusClient::new(None);
    let engine = DialogEngine::new(memory, status, reply_tx, false).expect("engine must build");

    let session = tokio::spawn(run_session(skill_read, skill_write, engine, reply_rx));
    let replies = FramedRead::new(host_read, FrameCodec::new());
    (host_write, replies, session)
}

async fn next_reply(
    replies: &mut FramedRead<tokio::io::ReadHalf<tokio::io::DuplexStream>, FrameCodec>,
) -> Frame {
    replies
        .next()
        .await
        .expect("a reply frame must arrive")
        .expect("reply must decode")
}

/// A complete happy path: user supplies both slots, the skill replies with
/// the interim message and the formatted success summary, and the host's
/// termination frame shuts the session down cleanly.
#[tokio::test]
async fn full_session_round_trip() {
    let repo_url = spawn_status_backend().await;
    let (mut host_write, mut replies, session) = spawn_session(4096);

    host_write
        .write_all(&user_turn_bytes(&format!("帮我查一下 {repo_url} 的 alpha-v1.0")))
        .await
        .expect("host write must succeed");

    let interim = next_reply(&mut replies).await;
    assert_eq!(interim.event_type, EVENT_SERVER_MESSAGE);
    assert_eq!(interim.body["messages"]["content"], "马上帮你查询，请稍候");

    let final_reply = next_reply(&mut replies).await;
    assert_eq!(final_reply.body["end"], true);
    let content = final_reply.body["messages"]["content"]
        .as_str()
        .expect("content must be a string");
    assert!(content.contains("成功"));
    assert!(content.contains("Auto名称: test-auto"));

    host_write
        .write_all(&terminate_bytes())
        .await
        .expect("host write must succeed");

    let outcome = session.await.expect("session task must not panic");
    assert!(outcome.is_ok(), "session must close cleanly, got {outcome:?}");
}

/// A frame delivered in tiny chunks is reassembled before the turn runs.
#[tokio::test]
async fn chunked_frame_is_reassembled() {
    let (mut host_write, mut replies, _session) = spawn_session(4096);

    let raw = user_turn_bytes("你好");
    for chunk in raw.chunks(3) {
        host_write
            .write_all(chunk)
            .await
            .expect("chunk write must succeed");
    }

    let reply = next_reply(&mut replies).await;
    assert!(reply.body["messages"]["content"]
        .as_str()
        .expect("content must be a string")
        .contains("请提供发布仓的地址和发布tag"));
}

/// Corrupt magic closes the channel with a framing error and the host sees
/// no further reply frames.
#[tokio::test]
async fn bad_magic_closes_channel() {
    let (mut host_write, mut replies, session) = spawn_session(4096);

    let mut raw = user_turn_bytes("hello");
    raw[0] ^= 0xFF;
    host_write.write_all(&raw).await.expect("write must succeed");

    let outcome = session.await.expect("session task must not panic");
    assert!(
        matches!(outcome, Err(AppError::Framing(_))),
        "expected framing error, got {outcome:?}"
    );

    // Writer shuts down; the host-side stream ends without further frames.
    assert!(replies.next().await.is_none());
}

/// An unknown inbound event type is skipped; the session keeps serving
/// subsequent turns.
#[tokio::test]
async fn unknown_event_type_is_skipped() {
    let (mut host_write, mut replies, _session) = spawn_session(4096);

    let stray = encode_frame(4242, &json!({ "anything": true })).expect("encode must succeed");
    host_write.write_all(&stray).await.expect("write must succeed");
    host_write
        .write_all(&user_turn_bytes("你好"))
        .await
        .expect("write must succeed");

    let reply = next_reply(&mut replies).await;
    assert!(reply.body["messages"]["content"]
        .as_str()
        .expect("content must be a string")
        .contains("请提供发布仓的地址和发布tag"));
}

/// A termination frame alone shuts the session down without any reply.
#[tokio::test]
async fn termination_frame_closes_cleanly() {
    let (mut host_write, mut replies, session) = spawn_session(4096);

    host_write
        .write_all(&terminate_bytes())
        .await
        .expect("write must succeed");

    let outcome = session.await.expect("session task must not panic");
    assert!(outcome.is_ok());
    assert!(replies.next().await.is_none(), "no replies expected");
}
