// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Starting and probing the `aod` background process.

use std::path::PathBuf;
use std::time::Duration;

use crate::client::ClientError;

/// Start the daemon in the background, returning the child process handle.
pub fn start_daemon_background() -> Result<std::process::Child, ClientError> {
    let aod_path = find_aod_binary()?;
    std::process::Command::new(&aod_path)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn()
        .map_err(|e| ClientError::DaemonStartFailed(e.to_string()))
}

/// Whether a socket file exists at the given path (a cheap liveness probe;
/// a real connection attempt is still needed to confirm something is
/// actually listening).
pub fn probe_socket(socket_path: &std::path::Path) -> bool {
    socket_path.exists()
}

/// Locate the `aod` binary: `AO_DAEMON_BIN` override, then a sibling of the
/// currently running `ao` binary (the normal installed-alongside case).
fn find_aod_binary() -> Result<PathBuf, ClientError> {
    if let Ok(path) = std::env::var("AO_DAEMON_BIN") {
        return Ok(PathBuf::from(path));
    }

    let current_exe = std::env::current_exe().map_err(|e| ClientError::DaemonStartFailed(e.to_string()))?;
    let sibling = current_exe.with_file_name("aod");
    if sibling.exists() {
        return Ok(sibling);
    }

    Err(ClientError::DaemonStartFailed(
        "could not locate the aod binary; set AO_DAEMON_BIN".to_string(),
    ))
}

pub const STARTUP_POLL_INTERVAL: Duration = Duration::from_millis(50);
