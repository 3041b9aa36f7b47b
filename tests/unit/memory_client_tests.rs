//! Unit tests for the memory store HTTP client against a local test host.

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use auto_status_skill::clients::memory::MemoryClient;
use auto_status_skill::clients::MemoryStore;

type Recorded = Arc<Mutex<Vec<Value>>>;

async fn serve(app: Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port must bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    port
}

async fn memory_host(recorded: Recorded) -> u16 {
    async fn handler(
        State(recorded): State<Recorded>,
        Json(body): Json<Value>,
    ) -> Json<Value> {
        recorded.lock().unwrap().push(body.clone());
        // The host answers an empty string for keys it has never seen.
        let value = if body["action"] == "query_tool_memory" && body["key"] == "repoUrl" {
            "https://git.ipanel.cn/git/playcube/playcube.release.git"
        } else {
            ""
        };
        Json(json!({
            "event_type": 3000,
            "action": "get_tool_memory",
            "key": body["key"],
            "value": value,
        }))
    }

    serve(Router::new().route("/", post(handler)).with_state(recorded)).await
}

/// A stored key comes back as `Some`, with the request shaped per the host
/// memory interface.
#[tokio::test]
async fn query_returns_stored_value() {
    let recorded: Recorded = Arc::default();
    let port = memory_host(Arc::clone(&recorded)).await;
    let client = MemoryClient::new(Some(port));

    let value = client.query("repoUrl", "u-1").await;
    assert_eq!(
        value.as_deref(),
        Some("https://git.ipanel.cn/git/playcube/playcube.release.git")
    );

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["event_type"], 3000);
    assert_eq!(requests[0]["action"], "query_tool_memory");
    assert_eq!(requests[0]["key"], "repoUrl");
    assert_eq!(requests[0]["dialog_id"], "u-1");
}

/// The host's empty-string answer for an unknown key is reported as absent.
#[tokio::test]
async fn empty_value_is_absent() {
    let port = memory_host(Arc::default()).await;
    let client = MemoryClient::new(Some(port));

    assert_eq!(client.query("tag", "u-1").await, None);
}

/// Without a configured port every query degrades to absent.
#[tokio::test]
async fn missing_port_degrades_to_absent() {
    let client = MemoryClient::new(None);
    assert_eq!(client.query("repoUrl", "u-1").await, None);
}

/// A non-200 answer degrades to absent rather than failing the turn.
#[tokio::test]
async fn server_error_degrades_to_absent() {
    async fn handler() -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
    let port = serve(Router::new().route("/", post(handler))).await;
    let client = MemoryClient::new(Some(port));

    assert_eq!(client.query("repoUrl", "u-1").await, None);
}

/// An unreachable host degrades to absent.
#[tokio::test]
async fn unreachable_host_degrades_to_absent() {
    // Bind then drop a listener so the port is very likely closed.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("ephemeral port must bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);

    let client = MemoryClient::new(Some(port));
    assert_eq!(client.query("repoUrl", "u-1").await, None);
}

/// Saves post the full action body; the caller is not informed of the
/// outcome either way.
#[tokio::test]
async fn save_posts_action_body() {
    let recorded: Recorded = Arc::default();
    let port = memory_host(Arc::clone(&recorded)).await;
    let client = MemoryClient::new(Some(port));

    client.save("tag", "alpha-v1.0", "u-1").await;

    let requests = recorded.lock().unwrap().clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["action"], "save_tool_memory");
    assert_eq!(requests[0]["key"], "tag");
    assert_eq!(requests[0]["value"], "alpha-v1.0");
    assert_eq!(requests[0]["dialog_id"], "u-1");
}
