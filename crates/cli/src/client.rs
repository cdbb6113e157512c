// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon client: connects to (and, if needed, starts) `aod` over its Unix
//! socket and exchanges one length-prefixed JSON request/response pair per
//! call.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use ao_daemon::{protocol_wire, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

use crate::daemon_process::{probe_socket, start_daemon_background, STARTUP_POLL_INTERVAL};
use crate::env;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not running")]
    DaemonNotRunning,

    #[error("failed to start daemon: {0}")]
    DaemonStartFailed(String),

    #[error("timed out waiting for the daemon to start")]
    DaemonStartTimeout,

    #[error("protocol error: {0}")]
    Protocol(#[from] protocol_wire::ProtocolError),

    #[error("unexpected response from daemon")]
    UnexpectedResponse,

    #[error("daemon reported an error ({kind}): {message}")]
    Rejected { kind: String, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine a state directory")]
    NoStateDir,
}

fn timeout_connect() -> Duration {
    env::duration_ms("AO_TIMEOUT_CONNECT_MS").unwrap_or(Duration::from_secs(5))
}

fn timeout_ipc() -> Duration {
    env::duration_ms("AO_TIMEOUT_IPC_MS").unwrap_or(Duration::from_secs(10))
}

pub struct DaemonClient {
    socket_path: PathBuf,
}

impl DaemonClient {
    /// Connect for a mutating command, starting the daemon if it isn't
    /// already running.
    pub async fn for_action() -> Result<Self, ClientError> {
        let socket_path = env::socket_path()?;
        if probe_socket(&socket_path) {
            if let Ok(client) = Self::connect(&socket_path).await {
                return Ok(client);
            }
            // Stale socket file with nothing listening; clean it up and start fresh.
            let _ = std::fs::remove_file(&socket_path);
        }
        start_daemon_background()?;
        Self::connect_with_retry(&socket_path, timeout_connect()).await
    }

    /// Connect for a read-only command; no auto-start.
    pub async fn for_query() -> Result<Self, ClientError> {
        let socket_path = env::socket_path()?;
        Self::connect(&socket_path).await.map_err(|_| ClientError::DaemonNotRunning)
    }

    async fn connect(socket_path: &std::path::Path) -> Result<Self, ClientError> {
        UnixStream::connect(socket_path).await?;
        Ok(Self {
            socket_path: socket_path.to_path_buf(),
        })
    }

    async fn connect_with_retry(socket_path: &std::path::Path, timeout: Duration) -> Result<Self, ClientError> {
        let start = Instant::now();
        loop {
            if let Ok(client) = Self::connect(socket_path).await {
                return Ok(client);
            }
            if start.elapsed() >= timeout {
                return Err(ClientError::DaemonStartTimeout);
            }
            tokio::time::sleep(STARTUP_POLL_INTERVAL).await;
        }
    }

    pub async fn call(&self, request: Request) -> Result<Response, ClientError> {
        let mut stream = UnixStream::connect(&self.socket_path).await?;
        let bytes = protocol_wire::encode(&request)?;
        tokio::time::timeout(timeout_ipc(), protocol_wire::write_message(&mut stream, &bytes))
            .await
            .map_err(|_| protocol_wire::ProtocolError::Timeout)??;
        let response_bytes = tokio::time::timeout(timeout_ipc(), protocol_wire::read_message(&mut stream))
            .await
            .map_err(|_| protocol_wire::ProtocolError::Timeout)??;
        let response: Response = protocol_wire::decode(&response_bytes)?;
        Ok(response)
    }

    /// Like `call`, but turns `Response::Error` into `ClientError::Rejected`
    /// so command handlers only need to pattern-match the success variant.
    pub async fn call_checked(&self, request: Request) -> Result<Response, ClientError> {
        match self.call(request).await? {
            Response::Error { kind, message } => Err(ClientError::Rejected { kind, message }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
