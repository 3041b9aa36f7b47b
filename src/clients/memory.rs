//! HTTP client for the host's key/value memory interface.
//!
//! The host exposes one POST endpoint on localhost; every request carries
//! event type 3000 and an `action` discriminator. Queries return a JSON
//! body with a `value` field; the host answers an empty string for keys it
//! has never seen, which this client reports as absent.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clients::MemoryStore;
use crate::protocol::frame::EVENT_MEMORY_ACTION;

const ACTION_QUERY: &str = "query_tool_memory";
const ACTION_SAVE: &str = "save_tool_memory";

#[derive(Debug, Serialize)]
struct MemoryRequest<'a> {
    event_type: u16,
    action: &'a str,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
    dialog_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct MemoryResponse {
    #[serde(default)]
    value: Option<String>,
}

/// Client for the host memory HTTP interface on `127.0.0.1:{port}`.
///
/// A client without a configured port answers every query with `None` and
/// drops every save; the host only passes `--port` when the memory
/// interface is available.
#[derive(Debug, Clone)]
pub struct MemoryClient {
    http: reqwest::Client,
    port: Option<u16>,
}

impl MemoryClient {
    /// Create a client targeting the host memory interface, if configured.
    #[must_use]
    pub fn new(port: Option<u16>) -> Self {
        Self {
            http: reqwest::Client::new(),
            port,
        }
    }

    fn endpoint(&self) -> Option<String> {
        self.port.map(|port| format!("http://127.0.0.1:{port}/"))
    }

    async fn post(&self, endpoint: &str, request: &MemoryRequest<'_>) -> Result<MemoryResponse, String> {
        let response = self
            .http
            .post(endpoint)
            .json(request)
            .send()
            .await
            .map_err(|err| format!("request failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("unexpected status {status}"));
        }

        if request.action == ACTION_SAVE {
            // Saves only need the 2xx; the body is not specified.
            return Ok(MemoryResponse { value: None });
        }

        response
            .json::<MemoryResponse>()
            .await
            .map_err(|err| format!("unparsable body: {err}"))
    }
}

impl MemoryStore for MemoryClient {
    fn query<'a>(
        &'a self,
        key: &'a str,
        scope: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>> {
        Box::pin(async move {
            let Some(endpoint) = self.endpoint() else {
                debug!(key, "memory query skipped: no port configured");
                return None;
            };
            let request = MemoryRequest {
                event_type: EVENT_MEMORY_ACTION,
                action: ACTION_QUERY,
                key,
                value: None,
                dialog_id: scope,
            };
            match self.post(&endpoint, &request).await {
                Ok(response) => response.value.filter(|v| !v.is_empty()),
                Err(reason) => {
                    warn!(key, scope, %reason, "memory query degraded to absent");
                    None
                }
            }
        })
    }

    fn save<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        scope: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            let Some(endpoint) = self.endpoint() else {
                debug!(key, "memory save skipped: no port configured");
                return;
            };
            let request = MemoryRequest {
                event_type: EVENT_MEMORY_ACTION,
                action: ACTION_SAVE,
                key,
                value: Some(value),
                dialog_id: scope,
            };
            if let Err(reason) = self.post(&endpoint, &request).await {
                warn!(key, scope, %reason, "memory save failed");
            }
        })
    }
}
