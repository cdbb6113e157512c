// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake tracker adapter for testing.

use super::{IssueDraft, IssuePatch, TrackerAdapter, TrackerError};
use ao_core::{Issue, ProjectId};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct FakeTrackerAdapter {
    issues: Arc<Mutex<HashMap<String, Issue>>>,
}

impl FakeTrackerAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, issue: Issue) {
        self.issues.lock().insert(issue.id.clone(), issue);
    }
}

#[async_trait]
impl TrackerAdapter for FakeTrackerAdapter {
    async fn get_issue(&self, id: &str, _project_id: &ProjectId) -> Result<Issue, TrackerError> {
        self.issues
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| TrackerError::NotFound(id.to_string()))
    }

    async fn is_completed(&self, id: &str, project_id: &ProjectId) -> Result<bool, TrackerError> {
        Ok(self.get_issue(id, project_id).await?.is_completed())
    }

    fn issue_url(&self, id: &str, _project_id: &ProjectId) -> String {
        format!("https://tracker.test/issues/{id}")
    }

    fn issue_label(&self, url: &str, _project_id: &ProjectId) -> String {
        url.rsplit('/').next().unwrap_or(url).to_string()
    }

    fn branch_name(&self, id: &str, _project_id: &ProjectId) -> String {
        format!("agent/{id}")
    }

    async fn generate_prompt(&self, id: &str, project_id: &ProjectId) -> Result<String, TrackerError> {
        let issue = self.get_issue(id, project_id).await?;
        Ok(format!("{}\n\n{}", issue.title, issue.description))
    }

    async fn update_issue(
        &self,
        id: &str,
        _project_id: &ProjectId,
        patch: &IssuePatch,
    ) -> Result<(), TrackerError> {
        let mut issues = self.issues.lock();
        let issue = issues.get_mut(id).ok_or_else(|| TrackerError::NotFound(id.to_string()))?;
        if let Some(state) = &patch.state {
            if state == "closed" {
                issue.state = ao_core::IssueState::Closed;
            }
        }
        Ok(())
    }

    async fn create_issue(&self, _project_id: &ProjectId, draft: &IssueDraft) -> Result<Issue, TrackerError> {
        let mut issues = self.issues.lock();
        let id = format!("fake-{}", issues.len() + 1);
        let issue = Issue {
            id: id.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            state: ao_core::IssueState::Open,
            labels: draft.labels.clone(),
            assignee: None,
            priority: None,
        };
        issues.insert(id, issue.clone());
        Ok(issue)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
