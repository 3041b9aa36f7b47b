//! HTTP client for the automated-build status backend.

use std::future::Future;
use std::pin::Pin;

use serde::Deserialize;
use tracing::debug;

use crate::clients::StatusBackend;
use crate::{AppError, Result};

/// Six named fields describing one automated build, as returned in
/// `data.data` of the backend envelope. Field names on the wire are the
/// backend's own Chinese keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AutoBuildInfo {
    /// Auto job name.
    #[serde(rename = "auto名称")]
    pub auto_name: String,
    /// Buildee name.
    #[serde(rename = "buildee名称")]
    pub buildee_name: String,
    /// Auto start time.
    #[serde(rename = "auto启动时间")]
    pub auto_started_at: String,
    /// Current health state.
    #[serde(rename = "健康状况")]
    pub health_state: String,
    /// How long the current health state has lasted.
    #[serde(rename = "健康持续时长")]
    pub health_duration: String,
    /// When the current health state began.
    #[serde(rename = "健康开始时间")]
    pub health_since: String,
}

/// Classified backend response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    /// `error_code == 0`: the build information was returned.
    Success(AutoBuildInfo),
    /// `error_code != 0`: the backend's own `result` text.
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    error_code: i64,
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    data: Option<AutoBuildInfo>,
}

/// Client issuing `GET {repo_url}/build/get_auto_info/{tag}` with a static
/// authorization header.
#[derive(Debug, Clone)]
pub struct StatusClient {
    http: reqwest::Client,
    auth_header: Option<String>,
}

impl StatusClient {
    /// Create a client; `auth_header` is sent verbatim as `Authorization`
    /// when present.
    #[must_use]
    pub fn new(auth_header: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_header,
        }
    }
}

impl StatusBackend for StatusClient {
    fn fetch<'a>(
        &'a self,
        repo_url: &'a str,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusReport>> + Send + 'a>> {
        Box::pin(async move {
            let url = format!("{repo_url}/build/get_auto_info/{tag}");
            debug!(%url, "querying build status backend");

            let mut request = self.http.get(&url);
            if let Some(ref auth) = self.auth_header {
                request = request.header(reqwest::header::AUTHORIZATION, auth);
            }

            let response = request
                .send()
                .await
                .map_err(|err| AppError::Status(err.to_string()))?
                .error_for_status()
                .map_err(|err| AppError::Status(err.to_string()))?;

            let envelope = response
                .json::<StatusEnvelope>()
                .await
                .map_err(|err| AppError::Status(err.to_string()))?;

            if envelope.error_code == 0 {
                let info = envelope.data.ok_or_else(|| {
                    AppError::Status("error_code 0 without data payload".to_owned())
                })?;
                Ok(StatusReport::Success(info))
            } else {
                Ok(StatusReport::Failed(envelope.result.unwrap_or_default()))
            }
        })
    }
}
