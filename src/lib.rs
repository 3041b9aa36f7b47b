#![forbid(unsafe_code)]

//! `auto-status-skill` — conversational build-status skill process.
//!
//! Connects to a local socket provided by a host chat orchestrator, decodes
//! the host's binary-framed JSON protocol, and runs a slot-filling dialog
//! that collects a release repository URL and tag before querying an
//! automated-build status backend.

pub mod channel;
pub mod clients;
pub mod config;
pub mod dialog;
pub mod errors;
pub mod protocol;

pub use config::Config;
pub use errors::{AppError, Result};
