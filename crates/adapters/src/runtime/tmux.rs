// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tmux-backed runtime: one detached session per agent.

use super::{RuntimeAdapter, RuntimeError, RuntimeHandle, RuntimeLaunchConfig, RuntimeMetrics};
use crate::subprocess::{run_with_timeout, RUNTIME_TIMEOUT};
use ao_core::AttachmentInfo;
use async_trait::async_trait;
use tokio::process::Command;

#[derive(Clone, Default)]
pub struct TmuxRuntimeAdapter;

impl TmuxRuntimeAdapter {
    pub fn new() -> Self {
        Self
    }

    fn session_name(&self, cfg: &RuntimeLaunchConfig) -> String {
        format!("ao-{}", cfg.name)
    }
}

#[async_trait]
impl RuntimeAdapter for TmuxRuntimeAdapter {
    async fn create(&self, cfg: &RuntimeLaunchConfig) -> Result<RuntimeHandle, RuntimeError> {
        if !cfg.cwd.exists() {
            return Err(RuntimeError::CreateFailed(format!(
                "working directory does not exist: {}",
                cfg.cwd.display()
            )));
        }

        let id = self.session_name(cfg);

        let existing = Command::new("tmux")
            .args(["has-session", "-t", &id])
            .output()
            .await;
        if existing.map(|o| o.status.success()).unwrap_or(false) {
            tracing::warn!(session = %id, "tmux session already exists, killing first");
            let _ = Command::new("tmux").args(["kill-session", "-t", &id]).output().await;
        }

        let mut tmux_cmd = Command::new("tmux");
        tmux_cmd
            .arg("new-session")
            .arg("-d")
            .arg("-s")
            .arg(&id)
            .arg("-c")
            .arg(&cfg.cwd);
        for (key, value) in &cfg.env {
            tmux_cmd.arg("-e").arg(format!("{key}={value}"));
        }
        tmux_cmd.arg(&cfg.command);

        let output = run_with_timeout(tmux_cmd, RUNTIME_TIMEOUT, "tmux new-session")
            .await
            .map_err(RuntimeError::CreateFailed)?;
        if !output.status.success() {
            return Err(RuntimeError::CreateFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        Ok(RuntimeHandle {
            id,
            runtime_name: "tmux".to_string(),
        })
    }

    async fn destroy(&self, handle: &RuntimeHandle) -> Result<(), RuntimeError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["kill-session", "-t", &handle.id]);
        // A missing session is not an error: destroy is idempotent.
        let _ = run_with_timeout(cmd, RUNTIME_TIMEOUT, "tmux kill-session").await;
        Ok(())
    }

    async fn send_message(&self, handle: &RuntimeHandle, message: &str) -> Result<(), RuntimeError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["send-keys", "-t", &handle.id, "-l", "--", message]);
        let output = run_with_timeout(cmd, RUNTIME_TIMEOUT, "tmux send-keys")
            .await
            .map_err(RuntimeError::CommandFailed)?;
        if !output.status.success() {
            return Err(RuntimeError::NotFound(handle.id.clone()));
        }

        let mut enter = Command::new("tmux");
        enter.args(["send-keys", "-t", &handle.id, "Enter"]);
        run_with_timeout(enter, RUNTIME_TIMEOUT, "tmux send-keys enter")
            .await
            .map_err(RuntimeError::CommandFailed)?;
        Ok(())
    }

    async fn get_output(
        &self,
        handle: &RuntimeHandle,
        lines: Option<u32>,
    ) -> Result<String, RuntimeError> {
        let lines = lines.unwrap_or(200);
        let mut cmd = Command::new("tmux");
        cmd.args([
            "capture-pane",
            "-t",
            &handle.id,
            "-p",
            "-S",
            &format!("-{lines}"),
        ]);
        let output = run_with_timeout(cmd, RUNTIME_TIMEOUT, "tmux capture-pane")
            .await
            .map_err(RuntimeError::CommandFailed)?;
        if !output.status.success() {
            return Err(RuntimeError::NotFound(handle.id.clone()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let mut cmd = Command::new("tmux");
        cmd.args(["has-session", "-t", &handle.id]);
        let output = run_with_timeout(cmd, RUNTIME_TIMEOUT, "tmux has-session")
            .await
            .map_err(RuntimeError::CommandFailed)?;
        Ok(output.status.success())
    }

    async fn get_attach_info(
        &self,
        handle: &RuntimeHandle,
    ) -> Result<Option<AttachmentInfo>, RuntimeError> {
        Ok(Some(AttachmentInfo {
            kind: ao_core::AttachmentKind::Tmux,
            target: handle.id.clone(),
            command: format!("tmux attach -t {}", handle.id),
        }))
    }

    async fn get_metrics(&self, _handle: &RuntimeHandle) -> Result<Option<RuntimeMetrics>, RuntimeError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "tmux_tests.rs"]
mod tests;
