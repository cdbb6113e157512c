// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake agent adapter for testing the core's agent-facing logic.

use super::{ActivityObservation, AgentAdapter, AgentError, AgentLaunchConfig};
use ao_core::{Activity, AgentInfo, Session};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum AgentCall {
    GetLaunchCommand,
    GetActivityState { session_id: String },
    PostLaunchSetup { session_id: String },
}

struct State {
    calls: Vec<AgentCall>,
    activity: Activity,
    session_info: Option<AgentInfo>,
    process_running: bool,
}

#[derive(Clone)]
pub struct FakeAgentAdapter {
    name: String,
    inner: Arc<Mutex<State>>,
}

impl Default for FakeAgentAdapter {
    fn default() -> Self {
        Self {
            name: "fake".to_string(),
            inner: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                activity: Activity::Active,
                session_info: None,
                process_running: true,
            })),
        }
    }
}

impl FakeAgentAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_activity(&self, activity: Activity) {
        self.inner.lock().activity = activity;
    }

    pub fn set_session_info(&self, info: AgentInfo) {
        self.inner.lock().session_info = Some(info);
    }

    pub fn set_process_running(&self, running: bool) {
        self.inner.lock().process_running = running;
    }
}

#[async_trait]
impl AgentAdapter for FakeAgentAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn process_name(&self) -> &str {
        &self.name
    }

    fn get_launch_command(&self, cfg: &AgentLaunchConfig) -> String {
        self.inner.lock().calls.push(AgentCall::GetLaunchCommand);
        format!("{} --prompt {:?}", self.name, cfg.prompt)
    }

    fn get_environment(&self, _cfg: &AgentLaunchConfig) -> Vec<(String, String)> {
        Vec::new()
    }

    fn detect_activity(&self, terminal_output: &str) -> Activity {
        if terminal_output.contains("waiting") {
            Activity::WaitingInput
        } else {
            self.inner.lock().activity
        }
    }

    async fn is_process_running(&self, _runtime_handle_id: &str) -> Result<bool, AgentError> {
        Ok(self.inner.lock().process_running)
    }

    async fn get_activity_state(
        &self,
        session: &Session,
        _threshold_secs: Option<u64>,
    ) -> Result<ActivityObservation, AgentError> {
        let mut state = self.inner.lock();
        state.calls.push(AgentCall::GetActivityState {
            session_id: session.id.as_str().to_string(),
        });
        Ok(ActivityObservation {
            state: state.activity,
            timestamp_ms: session.last_activity_at_ms,
        })
    }

    async fn get_session_info(&self, _session: &Session) -> Result<Option<AgentInfo>, AgentError> {
        Ok(self.inner.lock().session_info.clone())
    }

    async fn post_launch_setup(&self, session: &Session) -> Result<(), AgentError> {
        self.inner.lock().calls.push(AgentCall::PostLaunchSetup {
            session_id: session.id.as_str().to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
