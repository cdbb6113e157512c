// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI crate. Resolution
//! mirrors the daemon's own `env::state_dir` so both sides agree on where
//! the socket lives without sharing a config file.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

/// Resolve state directory: `AO_STATE_DIR` > `XDG_STATE_HOME/ao` > `~/.local/state/ao`.
fn state_dir() -> Result<PathBuf, ClientError> {
    if let Ok(dir) = std::env::var("AO_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ao"));
    }
    let home = std::env::var("HOME").map_err(|_| ClientError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ao"))
}

/// Path to the daemon's Unix socket.
pub fn socket_path() -> Result<PathBuf, ClientError> {
    Ok(state_dir()?.join("daemon.sock"))
}

/// Parse an env var as a millisecond duration override.
pub fn duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var).ok().and_then(|s| s.parse::<u64>().ok()).map(Duration::from_millis)
}
