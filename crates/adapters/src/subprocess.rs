// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers: `execFile`-style wrappers with timeouts.
//! No plugin shells out through `sh -c`; every invocation is argv-exact.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for runtime control commands (tmux, docker, …).
pub const RUNTIME_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for git worktree operations.
pub const GIT_WORKTREE_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for SCM/tracker CLI helpers.
pub const SCM_CLI_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess with a timeout. The child is killed on drop if the
/// timeout elapses, so nothing is leaked when a plugin command hangs.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!(
            "{description} timed out after {}s",
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
