// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM adapter for projects with no PR hosting configured.

use super::{Comment, MergeMethod, PrState, ReviewSummary, ScmAdapter, ScmError};
use ao_core::{CiCheck, CiStatus, PrInfo, ProjectId, ReviewDecision, Session};
use async_trait::async_trait;

#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpScmAdapter;

impl NoOpScmAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ScmAdapter for NoOpScmAdapter {
    async fn detect_pr(&self, _session: &Session, _project_id: &ProjectId) -> Result<Option<PrInfo>, ScmError> {
        Ok(None)
    }

    async fn get_pr_state(&self, _pr: &PrInfo) -> Result<PrState, ScmError> {
        Ok(PrState::Open)
    }

    async fn get_pr_summary(&self, _pr: &PrInfo) -> Result<String, ScmError> {
        Ok(String::new())
    }

    async fn merge_pr(&self, _pr: &PrInfo, _method: Option<MergeMethod>) -> Result<(), ScmError> {
        Ok(())
    }

    async fn close_pr(&self, _pr: &PrInfo) -> Result<(), ScmError> {
        Ok(())
    }

    async fn get_ci_checks(&self, _pr: &PrInfo) -> Result<Vec<CiCheck>, ScmError> {
        Ok(Vec::new())
    }

    async fn get_ci_summary(&self, _pr: &PrInfo) -> Result<CiStatus, ScmError> {
        Ok(CiStatus::Unknown)
    }

    async fn get_reviews(&self, _pr: &PrInfo) -> Result<Vec<ReviewSummary>, ScmError> {
        Ok(Vec::new())
    }

    async fn get_review_decision(&self, _pr: &PrInfo) -> Result<ReviewDecision, ScmError> {
        Ok(ReviewDecision::Pending)
    }

    async fn get_pending_comments(&self, _pr: &PrInfo) -> Result<Vec<Comment>, ScmError> {
        Ok(Vec::new())
    }

    async fn get_automated_comments(&self, _pr: &PrInfo) -> Result<Vec<Comment>, ScmError> {
        Ok(Vec::new())
    }

    async fn get_mergeability(&self, _pr: &PrInfo) -> Result<bool, ScmError> {
        Ok(false)
    }
}

#[cfg(test)]
#[path = "noop_tests.rs"]
mod tests;
