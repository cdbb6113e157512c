// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker plugins: external issue-tracker integrations (Linear, GitHub
//! Issues, Jira, a flat file, …).

mod noop;

pub use noop::NoOpTrackerAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTrackerAdapter;

use ao_core::{Issue, ProjectId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("issue not found: {0}")]
    NotFound(String),
    #[error("tracker operation not supported")]
    NotSupported,
    #[error("tracker request failed: {0}")]
    RequestFailed(String),
}

#[derive(Debug, Clone, Default)]
pub struct IssuePatch {
    pub state: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub labels: Vec<String>,
}

#[async_trait]
pub trait TrackerAdapter: Send + Sync + 'static {
    async fn get_issue(&self, id: &str, project_id: &ProjectId) -> Result<Issue, TrackerError>;
    async fn is_completed(&self, id: &str, project_id: &ProjectId) -> Result<bool, TrackerError>;
    fn issue_url(&self, id: &str, project_id: &ProjectId) -> String;
    fn issue_label(&self, url: &str, project_id: &ProjectId) -> String;
    fn branch_name(&self, id: &str, project_id: &ProjectId) -> String;
    async fn generate_prompt(&self, id: &str, project_id: &ProjectId) -> Result<String, TrackerError>;

    async fn list_issues(&self, _project_id: &ProjectId) -> Result<Vec<Issue>, TrackerError> {
        Ok(Vec::new())
    }

    async fn update_issue(
        &self,
        _id: &str,
        _project_id: &ProjectId,
        _patch: &IssuePatch,
    ) -> Result<(), TrackerError> {
        Err(TrackerError::NotSupported)
    }

    async fn create_issue(
        &self,
        _project_id: &ProjectId,
        _draft: &IssueDraft,
    ) -> Result<Issue, TrackerError> {
        Err(TrackerError::NotSupported)
    }
}
