// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DTOs exchanged between `aod` and `ao` over the wire. Kept separate from
//! `ao_core::Session` so the wire shape can stay stable (string-typed status
//! fields, `#[serde(default)]` everywhere) even as the core's typed fields
//! evolve.

use ao_core::Session;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// One-line summary of a session, used for `ao status` / `list` tables.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSummary {
    pub id: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    pub status: String,
    pub activity: String,
    pub phase: String,
    pub last_activity_at_ms: u64,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.as_str().to_string(),
            project_id: s.project_id.as_str().to_string(),
            branch: s.branch.clone(),
            issue_id: s.issue_id.clone(),
            status: s.status.to_string(),
            activity: s.activity.to_string(),
            phase: s.phase.to_string(),
            last_activity_at_ms: s.last_activity_at_ms,
        }
    }
}

/// Full detail view for `ao status --id <id>` / `ao peek`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    pub review_round: u32,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at_ms: u64,
}

impl From<&Session> for SessionDetail {
    fn from(s: &Session) -> Self {
        Self {
            summary: SessionSummary::from(s),
            workspace_path: s.workspace_path.clone(),
            runtime_name: s.runtime_handle.as_ref().map(|h| h.runtime_name.clone()),
            agent_summary: s.agent_info.as_ref().and_then(|a| a.summary.clone()),
            agent_session_id: s.agent_info.as_ref().and_then(|a| a.agent_session_id.clone()),
            cost_usd: s.agent_info.as_ref().and_then(|a| a.cost.as_ref()).map(|c| c.usd),
            review_round: s.review_round(),
            metadata: s.metadata.clone(),
            created_at_ms: s.created_at_ms,
        }
    }
}

/// Per-project plugin wiring as known to the daemon, for `ao project list`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectSummary {
    pub project_id: String,
    pub repo_path: PathBuf,
    pub runtime: String,
    pub agent: String,
    pub workspace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scm: Option<String>,
    pub session_count: usize,
    pub active_session_count: usize,
}

/// Daemon-wide health snapshot for `ao status` with no `--id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonStatusPayload {
    pub version: String,
    pub uptime_secs: u64,
    pub project_count: usize,
    pub session_count: usize,
    pub active_session_count: usize,
    pub global_active: usize,
    pub global_max: usize,
}

#[cfg(test)]
#[path = "protocol_types_tests.rs"]
mod tests;
