// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent plugins: knows how to launch, recognize, and interpret one
//! specific coding-agent CLI (Claude Code, Codex, Aider, Gemini, …).

mod noop;

pub use noop::NoOpAgentAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCall, FakeAgentAdapter};

use ao_core::{Activity, AgentInfo, Session};
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent operation failed: {0}")]
    Failed(String),
}

/// Parameters the agent plugin needs to build its launch command and
/// environment. `prompt` is the rendered tracker prompt (may be empty for
/// restores).
#[derive(Debug, Clone, Default)]
pub struct AgentLaunchConfig {
    pub prompt: String,
    pub model: Option<String>,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ActivityObservation {
    pub state: Activity,
    pub timestamp_ms: u64,
}

#[async_trait]
pub trait AgentAdapter: Send + Sync + 'static {
    fn name(&self) -> &str;
    fn process_name(&self) -> &str;
    fn get_launch_command(&self, cfg: &AgentLaunchConfig) -> String;
    fn get_environment(&self, cfg: &AgentLaunchConfig) -> Vec<(String, String)>;
    fn detect_activity(&self, terminal_output: &str) -> Activity;

    async fn is_process_running(&self, runtime_handle_id: &str) -> Result<bool, AgentError>;
    async fn get_activity_state(
        &self,
        session: &Session,
        threshold_secs: Option<u64>,
    ) -> Result<ActivityObservation, AgentError>;
    async fn get_session_info(&self, session: &Session) -> Result<Option<AgentInfo>, AgentError>;

    fn get_restore_command(&self, _session: &Session) -> Option<String> {
        None
    }

    async fn setup_workspace_hooks(
        &self,
        _path: &Path,
        _cfg: &AgentLaunchConfig,
    ) -> Result<(), AgentError> {
        Ok(())
    }

    async fn post_launch_setup(&self, _session: &Session) -> Result<(), AgentError> {
        Ok(())
    }
}

/// Extracts a bare process name from a launch command's argv[0], stripping
/// any path prefix (`/usr/local/bin/claude` → `claude`).
pub fn extract_process_name(launch_command: &str) -> &str {
    launch_command
        .split_whitespace()
        .next()
        .and_then(|argv0| argv0.rsplit('/').next())
        .unwrap_or(launch_command)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
