//! External collaborator clients.
//!
//! The dialog engine talks to two remote services through the
//! [`MemoryStore`] and [`StatusBackend`] traits so the state machine can be
//! exercised against in-process fakes. Production implementations live in
//! `memory` and `status`.

pub mod memory;
pub mod status;

use std::future::Future;
use std::pin::Pin;

use crate::clients::status::StatusReport;
use crate::Result;

/// Remote key/value memory owned by the host orchestrator.
pub trait MemoryStore: Send + Sync {
    /// Look up `key` within `scope`.
    ///
    /// Any failure — missing configuration, transport error, non-200,
    /// unparsable body — degrades to `None`; a memory lookup is never fatal
    /// to the turn.
    fn query<'a>(
        &'a self,
        key: &'a str,
        scope: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<String>> + Send + 'a>>;

    /// Persist `value` under `key` within `scope`, fire-and-forget.
    ///
    /// Implementations log failures; the active turn's reply is unaffected.
    fn save<'a>(
        &'a self,
        key: &'a str,
        value: &'a str,
        scope: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>>;
}

/// Build-status backend reached with one HTTP GET per completed slot set.
pub trait StatusBackend: Send + Sync {
    /// Fetch and classify the automated-build status for `repo_url`/`tag`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Status`](crate::AppError::Status) on transport
    /// failure, a non-2xx response, or a malformed body.
    fn fetch<'a>(
        &'a self,
        repo_url: &'a str,
        tag: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<StatusReport>> + Send + 'a>>;
}
