// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Git-worktree-backed workspace: each session gets its own worktree off a
//! fresh branch, rooted under the project's resolved worktree directory.

use super::{WorkspaceAdapter, WorkspaceCreateConfig, WorkspaceError, WorkspaceInfo};
use crate::subprocess::{run_with_timeout, GIT_WORKTREE_TIMEOUT};
use ao_core::ProjectId;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

#[derive(Clone)]
pub struct GitWorktreeAdapter {
    worktree_root: PathBuf,
}

impl GitWorktreeAdapter {
    pub fn new(worktree_root: impl Into<PathBuf>) -> Self {
        Self {
            worktree_root: worktree_root.into(),
        }
    }

    fn worktree_path(&self, project_id: &ProjectId, branch: &str) -> PathBuf {
        let safe_branch = branch.replace('/', "-");
        self.worktree_root.join(project_id.as_str()).join(safe_branch)
    }
}

#[async_trait]
impl WorkspaceAdapter for GitWorktreeAdapter {
    async fn create(&self, cfg: &WorkspaceCreateConfig) -> Result<WorkspaceInfo, WorkspaceError> {
        let path = self.worktree_path(&cfg.project_id, &cfg.branch);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| WorkspaceError::CreateFailed(e.to_string()))?;
        }

        let mut cmd = Command::new("git");
        cmd.arg("-C")
            .arg(&cfg.repo_path)
            .arg("worktree")
            .arg("add")
            .arg("-b")
            .arg(&cfg.branch)
            .arg(&path);

        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree add")
            .await
            .map_err(WorkspaceError::CreateFailed)?;
        if !output.status.success() {
            return Err(WorkspaceError::CreateFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }

        Ok(WorkspaceInfo {
            path,
            branch: cfg.branch.clone(),
        })
    }

    async fn destroy(&self, path: &Path) -> Result<(), WorkspaceError> {
        let mut cmd = Command::new("git");
        cmd.arg("worktree").arg("remove").arg("--force").arg(path);
        let output = run_with_timeout(cmd, GIT_WORKTREE_TIMEOUT, "git worktree remove")
            .await
            .map_err(WorkspaceError::CommandFailed)?;
        if !output.status.success() {
            // Worktree already gone is fine; destroy is idempotent.
            tracing::warn!(path = %path.display(), stderr = %String::from_utf8_lossy(&output.stderr), "git worktree remove reported failure");
        }
        Ok(())
    }

    async fn list(&self, project_id: &ProjectId) -> Result<Vec<WorkspaceInfo>, WorkspaceError> {
        let project_dir = self.worktree_root.join(project_id.as_str());
        let mut entries = match tokio::fs::read_dir(&project_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(WorkspaceError::CommandFailed(e.to_string())),
        };

        let mut result = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| WorkspaceError::CommandFailed(e.to_string()))?
        {
            if entry
                .file_type()
                .await
                .map(|t| t.is_dir())
                .unwrap_or(false)
            {
                // The directory name is the sanitized branch name (`/` -> `-`);
                // exact original branch is read back from git itself, not recovered here.
                let branch = entry.file_name().to_string_lossy().into_owned();
                result.push(WorkspaceInfo {
                    path: entry.path(),
                    branch,
                });
            }
        }
        Ok(result)
    }

    async fn exists(&self, path: &Path) -> Result<bool, WorkspaceError> {
        Ok(tokio::fs::try_exists(path)
            .await
            .map_err(|e| WorkspaceError::CommandFailed(e.to_string()))?)
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
