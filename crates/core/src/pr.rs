// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SCM-agnostic pull-request descriptor.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiStatus {
    Pending,
    Passing,
    Failing,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    ChangesRequested,
    ReviewRequired,
    Pending,
}

/// A single named CI check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiCheck {
    pub name: String,
    pub status: CiStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// SCM-agnostic PR descriptor, as returned by the SCM plugin's `detectPR`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrInfo {
    pub number: u64,
    pub url: String,
    pub owner: String,
    pub repo: String,
    pub head_branch: String,
    pub base_branch: String,
    pub draft: bool,
    pub additions: u64,
    pub deletions: u64,
    #[serde(default)]
    pub ci_checks: Vec<CiCheck>,
    pub review_decision: ReviewDecision,
    pub mergeable: bool,
    pub merged: bool,
    pub closed: bool,
    #[serde(default)]
    pub unresolved_comment_count: u32,
}

impl PrInfo {
    /// Overall CI status derived from individual checks: any failing check
    /// fails the PR; any still pending makes it pending; otherwise passing.
    pub fn ci_summary(&self) -> CiStatus {
        if self.ci_checks.is_empty() {
            return CiStatus::Unknown;
        }
        if self.ci_checks.iter().any(|c| c.status == CiStatus::Failing) {
            CiStatus::Failing
        } else if self
            .ci_checks
            .iter()
            .any(|c| c.status == CiStatus::Pending)
        {
            CiStatus::Pending
        } else {
            CiStatus::Passing
        }
    }
}

#[cfg(test)]
#[path = "pr_tests.rs"]
mod tests;
