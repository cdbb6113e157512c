// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent adapter that never launches anything; useful for dry-run sessions.

use super::{ActivityObservation, AgentAdapter, AgentError, AgentLaunchConfig};
use ao_core::{Activity, AgentInfo, Session};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpAgentAdapter;

impl NoOpAgentAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AgentAdapter for NoOpAgentAdapter {
    fn name(&self) -> &str {
        "noop"
    }

    fn process_name(&self) -> &str {
        "true"
    }

    fn get_launch_command(&self, _cfg: &AgentLaunchConfig) -> String {
        "true".to_string()
    }

    fn get_environment(&self, _cfg: &AgentLaunchConfig) -> Vec<(String, String)> {
        Vec::new()
    }

    fn detect_activity(&self, _terminal_output: &str) -> Activity {
        Activity::Exited
    }

    async fn is_process_running(&self, _runtime_handle_id: &str) -> Result<bool, AgentError> {
        Ok(false)
    }

    async fn get_activity_state(
        &self,
        _session: &Session,
        _threshold_secs: Option<u64>,
    ) -> Result<ActivityObservation, AgentError> {
        Ok(ActivityObservation {
            state: Activity::Exited,
            timestamp_ms: 0,
        })
    }

    async fn get_session_info(&self, _session: &Session) -> Result<Option<AgentInfo>, AgentError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
