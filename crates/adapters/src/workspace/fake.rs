// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake workspace adapter for testing.

use super::{WorkspaceAdapter, WorkspaceCreateConfig, WorkspaceError, WorkspaceInfo};
use ao_core::ProjectId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum WorkspaceCall {
    Create { branch: String },
    Destroy { path: PathBuf },
}

struct State {
    calls: Vec<WorkspaceCall>,
    by_project: std::collections::HashMap<String, Vec<WorkspaceInfo>>,
}

#[derive(Clone)]
pub struct FakeWorkspaceAdapter {
    root: PathBuf,
    inner: Arc<Mutex<State>>,
}

impl Default for FakeWorkspaceAdapter {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/fake-workspaces"),
            inner: Arc::new(Mutex::new(State {
                calls: Vec::new(),
                by_project: std::collections::HashMap::new(),
            })),
        }
    }
}

impl FakeWorkspaceAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<WorkspaceCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl WorkspaceAdapter for FakeWorkspaceAdapter {
    async fn create(&self, cfg: &WorkspaceCreateConfig) -> Result<WorkspaceInfo, WorkspaceError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkspaceCall::Create {
            branch: cfg.branch.clone(),
        });
        let info = WorkspaceInfo {
            path: self.root.join(cfg.project_id.as_str()).join(&cfg.branch),
            branch: cfg.branch.clone(),
        };
        state
            .by_project
            .entry(cfg.project_id.as_str().to_string())
            .or_default()
            .push(info.clone());
        Ok(info)
    }

    async fn destroy(&self, path: &Path) -> Result<(), WorkspaceError> {
        let mut state = self.inner.lock();
        state.calls.push(WorkspaceCall::Destroy {
            path: path.to_path_buf(),
        });
        for infos in state.by_project.values_mut() {
            infos.retain(|i| i.path != path);
        }
        Ok(())
    }

    async fn list(&self, project_id: &ProjectId) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        Ok(self
            .inner
            .lock()
            .by_project
            .get(project_id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn exists(&self, path: &Path) -> Result<bool, WorkspaceError> {
        Ok(self
            .inner
            .lock()
            .by_project
            .values()
            .flatten()
            .any(|i| i.path == path))
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
