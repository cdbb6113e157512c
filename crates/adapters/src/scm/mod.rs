// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM plugins: source-control/PR-hosting integrations (GitHub, GitLab, …).

mod noop;

pub use noop::NoOpScmAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeScmAdapter;

use ao_core::{CiCheck, CiStatus, PrInfo, ProjectId, ReviewDecision, Session};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScmError {
    #[error("scm request failed: {0}")]
    RequestFailed(String),
    #[error("scm request timed out")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMethod {
    Merge,
    Squash,
    Rebase,
}

#[derive(Debug, Clone)]
pub struct ReviewSummary {
    pub reviewer: String,
    pub decision: ReviewDecision,
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub resolved: bool,
}

#[async_trait]
pub trait ScmAdapter: Send + Sync + 'static {
    async fn detect_pr(
        &self,
        session: &Session,
        project_id: &ProjectId,
    ) -> Result<Option<PrInfo>, ScmError>;
    async fn get_pr_state(&self, pr: &PrInfo) -> Result<PrState, ScmError>;
    async fn get_pr_summary(&self, pr: &PrInfo) -> Result<String, ScmError>;
    async fn merge_pr(&self, pr: &PrInfo, method: Option<MergeMethod>) -> Result<(), ScmError>;
    async fn close_pr(&self, pr: &PrInfo) -> Result<(), ScmError>;
    async fn get_ci_checks(&self, pr: &PrInfo) -> Result<Vec<CiCheck>, ScmError>;
    async fn get_ci_summary(&self, pr: &PrInfo) -> Result<CiStatus, ScmError>;
    async fn get_reviews(&self, pr: &PrInfo) -> Result<Vec<ReviewSummary>, ScmError>;
    async fn get_review_decision(&self, pr: &PrInfo) -> Result<ReviewDecision, ScmError>;
    async fn get_pending_comments(&self, pr: &PrInfo) -> Result<Vec<Comment>, ScmError>;
    async fn get_automated_comments(&self, pr: &PrInfo) -> Result<Vec<Comment>, ScmError>;
    async fn get_mergeability(&self, pr: &PrInfo) -> Result<bool, ScmError>;
}
