// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Resolve state directory: `AO_STATE_DIR` > `XDG_STATE_HOME/ao` > `~/.local/state/ao`.
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("AO_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("ao"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/ao"))
}

/// Poll-tick interval override (§12: defaults to 5000ms, read once at startup).
pub fn poll_interval_ms() -> u64 {
    std::env::var("AO_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(5_000)
}

pub fn poll_interval() -> Duration {
    Duration::from_millis(poll_interval_ms())
}

/// Global/per-project worker caps, overridable for local experimentation.
pub fn global_max() -> u32 {
    std::env::var("AO_GLOBAL_MAX")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ao_engine::DEFAULT_GLOBAL_MAX)
}

pub fn project_max_default() -> u32 {
    std::env::var("AO_PROJECT_MAX")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(ao_engine::DEFAULT_PROJECT_MAX)
}
