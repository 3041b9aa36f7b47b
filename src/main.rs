#![forbid(unsafe_code)]

//! `auto-status-skill` — conversational build-status skill binary.
//!
//! Connects to the host orchestrator's session socket, runs the dialog
//! engine over the framed channel, and exits when the host terminates the
//! session or the channel closes.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use interprocess::local_socket::tokio::prelude::*;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use auto_status_skill::channel;
use auto_status_skill::clients::memory::MemoryClient;
use auto_status_skill::clients::status::StatusClient;
use auto_status_skill::config::Config;
use auto_status_skill::dialog::engine::DialogEngine;
use auto_status_skill::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "auto-status-skill", about = "Automated build status skill", version, long_about = None)]
struct Cli {
    /// Path of the host session socket to connect to.
    #[arg(long)]
    socket: PathBuf,

    /// Port of the host memory HTTP interface on localhost.
    #[arg(long)]
    port: Option<u16>,

    /// Authorization header value for the status backend.
    #[arg(long, env = "AUTO_STATUS_AUTH")]
    auth: Option<String>,

    /// Save slots to the memory store after collecting them.
    #[arg(long, default_value_t = false)]
    persist_slots: bool,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("auto-status-skill bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    let config = Config {
        socket_path: args.socket,
        memory_port: args.port,
        auth_header: args.auth,
        persist_slots: args.persist_slots,
    };
    config.validate()?;

    let stream = channel::connect_host(&config.socket_path).await?;
    info!(socket = %config.socket_path.display(), "connected to host");
    let (reader, writer) = stream.split();

    let (reply_tx, reply_rx) = mpsc::channel(32);
    let memory = MemoryClient::new(config.memory_port);
    let status = StatusClient::new(config.auth_header.clone());
    let engine = DialogEngine::new(memory, status, reply_tx, config.persist_slots)?;

    let outcome = tokio::select! {
        result = channel::run_session(reader, writer, engine, reply_rx) => result,
        () = shutdown_signal() => {
            info!("shutdown signal received");
            Ok(())
        }
    };

    info!("auto-status-skill shut down");
    outcome
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
