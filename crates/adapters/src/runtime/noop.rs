// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime adapter that does nothing; used in minimal deployments.

use super::{RuntimeAdapter, RuntimeError, RuntimeHandle, RuntimeLaunchConfig};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpRuntimeAdapter;

impl NoOpRuntimeAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RuntimeAdapter for NoOpRuntimeAdapter {
    async fn create(&self, cfg: &RuntimeLaunchConfig) -> Result<RuntimeHandle, RuntimeError> {
        Ok(RuntimeHandle {
            id: format!("noop-{}", cfg.name),
            runtime_name: "noop".to_string(),
        })
    }

    async fn destroy(&self, _handle: &RuntimeHandle) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn send_message(&self, _handle: &RuntimeHandle, _message: &str) -> Result<(), RuntimeError> {
        Ok(())
    }

    async fn get_output(
        &self,
        _handle: &RuntimeHandle,
        _lines: Option<u32>,
    ) -> Result<String, RuntimeError> {
        Ok(String::new())
    }

    async fn is_alive(&self, _handle: &RuntimeHandle) -> Result<bool, RuntimeError> {
        Ok(false)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
