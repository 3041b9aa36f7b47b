//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Wire framing violation (bad magic, oversized body). Fatal for the
    /// channel: byte alignment is lost and no resynchronization is attempted.
    Framing(String),
    /// Channel-level failure (reply queue closed, socket write failure).
    Channel(String),
    /// Memory store collaborator failure.
    Memory(String),
    /// Build-status backend call failure (transport or malformed response).
    Status(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Framing(msg) => write!(f, "framing: {msg}"),
            Self::Channel(msg) => write!(f, "channel: {msg}"),
            Self::Memory(msg) => write!(f, "memory: {msg}"),
            Self::Status(msg) => write!(f, "status: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Channel(format!("json serialization: {err}"))
    }
}
