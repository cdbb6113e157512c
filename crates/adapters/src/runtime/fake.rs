// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake runtime adapter for testing the core without real tmux/docker.

use super::{RuntimeAdapter, RuntimeError, RuntimeHandle, RuntimeLaunchConfig, RuntimeMetrics};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum RuntimeCall {
    Create { name: String },
    Destroy { id: String },
    SendMessage { id: String, message: String },
}

#[derive(Debug, Clone, Default)]
struct FakeHost {
    alive: bool,
    output: String,
}

struct State {
    hosts: HashMap<String, FakeHost>,
    calls: Vec<RuntimeCall>,
    next_id: u64,
}

#[derive(Clone)]
pub struct FakeRuntimeAdapter {
    inner: Arc<Mutex<State>>,
}

impl Default for FakeRuntimeAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State {
                hosts: HashMap::new(),
                calls: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl FakeRuntimeAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_alive(&self, id: &str, alive: bool) {
        if let Some(host) = self.inner.lock().hosts.get_mut(id) {
            host.alive = alive;
        }
    }

    pub fn set_output(&self, id: &str, output: impl Into<String>) {
        if let Some(host) = self.inner.lock().hosts.get_mut(id) {
            host.output = output.into();
        }
    }
}

#[async_trait]
impl RuntimeAdapter for FakeRuntimeAdapter {
    async fn create(&self, cfg: &RuntimeLaunchConfig) -> Result<RuntimeHandle, RuntimeError> {
        let mut state = self.inner.lock();
        state.next_id += 1;
        let id = format!("fake-rt-{}", state.next_id);
        state.calls.push(RuntimeCall::Create {
            name: cfg.name.clone(),
        });
        state.hosts.insert(
            id.clone(),
            FakeHost {
                alive: true,
                output: String::new(),
            },
        );
        Ok(RuntimeHandle {
            id,
            runtime_name: "fake".to_string(),
        })
    }

    async fn destroy(&self, handle: &RuntimeHandle) -> Result<(), RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::Destroy {
            id: handle.id.clone(),
        });
        if let Some(host) = state.hosts.get_mut(&handle.id) {
            host.alive = false;
        }
        Ok(())
    }

    async fn send_message(&self, handle: &RuntimeHandle, message: &str) -> Result<(), RuntimeError> {
        let mut state = self.inner.lock();
        state.calls.push(RuntimeCall::SendMessage {
            id: handle.id.clone(),
            message: message.to_string(),
        });
        if !state.hosts.contains_key(&handle.id) {
            return Err(RuntimeError::NotFound(handle.id.clone()));
        }
        Ok(())
    }

    async fn get_output(
        &self,
        handle: &RuntimeHandle,
        _lines: Option<u32>,
    ) -> Result<String, RuntimeError> {
        let state = self.inner.lock();
        state
            .hosts
            .get(&handle.id)
            .map(|h| h.output.clone())
            .ok_or_else(|| RuntimeError::NotFound(handle.id.clone()))
    }

    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        let state = self.inner.lock();
        Ok(state.hosts.get(&handle.id).map(|h| h.alive).unwrap_or(false))
    }

    async fn get_metrics(&self, _handle: &RuntimeHandle) -> Result<Option<RuntimeMetrics>, RuntimeError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
