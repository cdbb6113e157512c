// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracker adapter for sessions spawned without a backing issue.

use super::{TrackerAdapter, TrackerError};
use ao_core::{Issue, IssueState, ProjectId};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpTrackerAdapter;

impl NoOpTrackerAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TrackerAdapter for NoOpTrackerAdapter {
    async fn get_issue(&self, id: &str, _project_id: &ProjectId) -> Result<Issue, TrackerError> {
        Ok(Issue {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            state: IssueState::Open,
            labels: Vec::new(),
            assignee: None,
            priority: None,
        })
    }

    async fn is_completed(&self, _id: &str, _project_id: &ProjectId) -> Result<bool, TrackerError> {
        Ok(false)
    }

    fn issue_url(&self, id: &str, _project_id: &ProjectId) -> String {
        id.to_string()
    }

    fn issue_label(&self, url: &str, _project_id: &ProjectId) -> String {
        url.to_string()
    }

    fn branch_name(&self, id: &str, _project_id: &ProjectId) -> String {
        format!("agent/{id}")
    }

    async fn generate_prompt(&self, id: &str, _project_id: &ProjectId) -> Result<String, TrackerError> {
        Ok(format!("Work on {id}"))
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
