// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace plugins: the on-disk working copy (git worktree, clone, or
//! tempdir) the agent edits.

mod git;
mod noop;

pub use git::GitWorktreeAdapter;
pub use noop::NoOpWorkspaceAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeWorkspaceAdapter, WorkspaceCall};

use ao_core::ProjectId;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("workspace create failed: {0}")]
    CreateFailed(String),
    #[error("workspace operation not supported")]
    NotSupported,
    #[error("workspace command failed: {0}")]
    CommandFailed(String),
}

#[derive(Debug, Clone)]
pub struct WorkspaceCreateConfig {
    pub project_id: ProjectId,
    pub repo_path: PathBuf,
    pub branch: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceInfo {
    pub path: PathBuf,
    pub branch: String,
}

#[async_trait]
pub trait WorkspaceAdapter: Send + Sync + 'static {
    async fn create(&self, cfg: &WorkspaceCreateConfig) -> Result<WorkspaceInfo, WorkspaceError>;
    async fn destroy(&self, path: &Path) -> Result<(), WorkspaceError>;
    async fn list(&self, project_id: &ProjectId) -> Result<Vec<WorkspaceInfo>, WorkspaceError>;
    async fn exists(&self, path: &Path) -> Result<bool, WorkspaceError>;

    async fn post_create(
        &self,
        _info: &WorkspaceInfo,
        _project_id: &ProjectId,
    ) -> Result<(), WorkspaceError> {
        Ok(())
    }

    async fn restore(
        &self,
        _cfg: &WorkspaceCreateConfig,
        _path: &Path,
    ) -> Result<WorkspaceInfo, WorkspaceError> {
        Err(WorkspaceError::NotSupported)
    }
}
