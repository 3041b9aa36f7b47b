//! Runtime configuration assembled from the command line and environment.
//!
//! The host orchestrator launches this process with `--socket` (always) and
//! `--port` (only when its memory HTTP interface is available); the status
//! backend credential comes from the environment so it never appears in the
//! host's process table.

use std::path::PathBuf;

use crate::{AppError, Result};

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the host orchestrator's session socket.
    pub socket_path: PathBuf,
    /// Port of the host's memory HTTP interface on localhost, if provided.
    pub memory_port: Option<u16>,
    /// Authorization header value sent to the status backend, if configured.
    pub auth_header: Option<String>,
    /// Save both slots to the memory store before every status query.
    /// Off by default; referential lookups only read memory.
    pub persist_slots: bool,
}

impl Config {
    /// Validate field combinations.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if the socket path is empty.
    pub fn validate(&self) -> Result<()> {
        if self.socket_path.as_os_str().is_empty() {
            return Err(AppError::Config("socket path must not be empty".to_owned()));
        }
        Ok(())
    }
}
