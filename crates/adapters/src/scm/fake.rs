// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake SCM adapter for testing the enrichment and reaction paths.

use super::{Comment, MergeMethod, PrState, ReviewSummary, ScmAdapter, ScmError};
use ao_core::{CiCheck, CiStatus, PrInfo, ProjectId, ReviewDecision, Session};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct FakeScmAdapter {
    prs: Arc<Mutex<HashMap<String, PrInfo>>>,
    merged: Arc<Mutex<Vec<u64>>>,
}

impl FakeScmAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the PR that `detect_pr` returns for a given session id.
    pub fn set_pr_for_session(&self, session_id: &str, pr: PrInfo) {
        self.prs.lock().insert(session_id.to_string(), pr);
    }

    pub fn merged_pr_numbers(&self) -> Vec<u64> {
        self.merged.lock().clone()
    }
}

#[async_trait]
impl ScmAdapter for FakeScmAdapter {
    async fn detect_pr(&self, session: &Session, _project_id: &ProjectId) -> Result<Option<PrInfo>, ScmError> {
        Ok(self.prs.lock().get(session.id.as_str()).cloned())
    }

    async fn get_pr_state(&self, pr: &PrInfo) -> Result<PrState, ScmError> {
        Ok(if pr.merged {
            PrState::Merged
        } else if pr.closed {
            PrState::Closed
        } else {
            PrState::Open
        })
    }

    async fn get_pr_summary(&self, pr: &PrInfo) -> Result<String, ScmError> {
        Ok(format!("#{} {}", pr.number, pr.url))
    }

    async fn merge_pr(&self, pr: &PrInfo, _method: Option<MergeMethod>) -> Result<(), ScmError> {
        self.merged.lock().push(pr.number);
        Ok(())
    }

    async fn close_pr(&self, _pr: &PrInfo) -> Result<(), ScmError> {
        Ok(())
    }

    async fn get_ci_checks(&self, pr: &PrInfo) -> Result<Vec<CiCheck>, ScmError> {
        Ok(pr.ci_checks.clone())
    }

    async fn get_ci_summary(&self, pr: &PrInfo) -> Result<CiStatus, ScmError> {
        Ok(pr.ci_summary())
    }

    async fn get_reviews(&self, pr: &PrInfo) -> Result<Vec<ReviewSummary>, ScmError> {
        Ok(vec![ReviewSummary {
            reviewer: "fake-reviewer".to_string(),
            decision: pr.review_decision,
        }])
    }

    async fn get_review_decision(&self, pr: &PrInfo) -> Result<ReviewDecision, ScmError> {
        Ok(pr.review_decision)
    }

    async fn get_pending_comments(&self, _pr: &PrInfo) -> Result<Vec<Comment>, ScmError> {
        Ok(Vec::new())
    }

    async fn get_automated_comments(&self, _pr: &PrInfo) -> Result<Vec<Comment>, ScmError> {
        Ok(Vec::new())
    }

    async fn get_mergeability(&self, pr: &PrInfo) -> Result<bool, ScmError> {
        Ok(pr.mergeable)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
