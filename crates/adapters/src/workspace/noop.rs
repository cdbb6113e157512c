// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace adapter that never touches disk; useful for dry-run sessions.

use super::{WorkspaceAdapter, WorkspaceCreateConfig, WorkspaceError, WorkspaceInfo};
use ao_core::ProjectId;
use async_trait::async_trait;
use std::path::Path;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpWorkspaceAdapter;

impl NoOpWorkspaceAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WorkspaceAdapter for NoOpWorkspaceAdapter {
    async fn create(&self, cfg: &WorkspaceCreateConfig) -> Result<WorkspaceInfo, WorkspaceError> {
        Ok(WorkspaceInfo {
            path: cfg.repo_path.clone(),
            branch: cfg.branch.clone(),
        })
    }

    async fn destroy(&self, _path: &Path) -> Result<(), WorkspaceError> {
        Ok(())
    }

    async fn list(&self, _project_id: &ProjectId) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        Ok(Vec::new())
    }

    async fn exists(&self, _path: &Path) -> Result<bool, WorkspaceError> {
        Ok(true)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
