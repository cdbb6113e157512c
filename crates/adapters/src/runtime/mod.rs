// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime plugins: the container/terminal/process host for an agent
//! (tmux, subprocess, docker, …). The core only ever talks to this trait.

mod noop;
mod tmux;

pub use noop::NoOpRuntimeAdapter;
pub use tmux::TmuxRuntimeAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeRuntimeAdapter, RuntimeCall};

use ao_core::AttachmentInfo;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("runtime handle not found: {0}")]
    NotFound(String),
    #[error("create failed: {0}")]
    CreateFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Launch parameters for a runtime host. `command` is the exact argv-0
/// invocation the agent plugin produced via `get_launch_command`.
#[derive(Debug, Clone)]
pub struct RuntimeLaunchConfig {
    pub name: String,
    pub cwd: PathBuf,
    pub command: String,
    pub env: Vec<(String, String)>,
}

/// Opaque handle returned by `create`. `id` is whatever the runtime needs
/// to address the host again (a tmux session name, a container id, a pid).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeHandle {
    pub id: String,
    pub runtime_name: String,
}

impl From<RuntimeHandle> for ao_core::RuntimeHandle {
    fn from(handle: RuntimeHandle) -> Self {
        ao_core::RuntimeHandle {
            id: handle.id,
            runtime_name: handle.runtime_name,
            data: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeMetrics {
    pub uptime_ms: u64,
    pub memory_mb: Option<f64>,
    pub cpu_percent: Option<f64>,
}

#[async_trait]
pub trait RuntimeAdapter: Send + Sync + 'static {
    async fn create(&self, cfg: &RuntimeLaunchConfig) -> Result<RuntimeHandle, RuntimeError>;
    async fn destroy(&self, handle: &RuntimeHandle) -> Result<(), RuntimeError>;
    async fn send_message(&self, handle: &RuntimeHandle, message: &str) -> Result<(), RuntimeError>;
    async fn get_output(
        &self,
        handle: &RuntimeHandle,
        lines: Option<u32>,
    ) -> Result<String, RuntimeError>;
    async fn is_alive(&self, handle: &RuntimeHandle) -> Result<bool, RuntimeError>;

    async fn get_metrics(
        &self,
        _handle: &RuntimeHandle,
    ) -> Result<Option<RuntimeMetrics>, RuntimeError> {
        Ok(None)
    }

    async fn get_attach_info(
        &self,
        _handle: &RuntimeHandle,
    ) -> Result<Option<AttachmentInfo>, RuntimeError> {
        Ok(None)
    }
}
