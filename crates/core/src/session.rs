// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Session` entity and its sub-records.
//!
//! A `Session` is one agent working one issue inside one isolated workspace.
//! `status` and `phase` are tracked separately: `status` is the
//! operational/lifecycle state (set by the Session Manager and Reaction
//! Engine), `phase` is the workflow stage (advanced only by the Phase
//! Manager). See the invariants in the core spec — a terminal `status`
//! forbids further state changes, and `runtime_handle = None` always implies
//! `activity == Exited`.

use crate::id::{ProjectId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Operational status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Spawning,
    Working,
    PrOpen,
    CiFailed,
    ReviewPending,
    ChangesRequested,
    Approved,
    Mergeable,
    Merged,
    Cleanup,
    NeedsInput,
    Stuck,
    Errored,
    Killed,
    Terminated,
    Done,
}

impl SessionStatus {
    /// Terminal statuses forbid any further state changes (core invariant).
    pub const TERMINAL: [SessionStatus; 6] = [
        SessionStatus::Merged,
        SessionStatus::Killed,
        SessionStatus::Cleanup,
        SessionStatus::Done,
        SessionStatus::Terminated,
        SessionStatus::Errored,
    ];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Spawning => "spawning",
            SessionStatus::Working => "working",
            SessionStatus::PrOpen => "pr_open",
            SessionStatus::CiFailed => "ci_failed",
            SessionStatus::ReviewPending => "review_pending",
            SessionStatus::ChangesRequested => "changes_requested",
            SessionStatus::Approved => "approved",
            SessionStatus::Mergeable => "mergeable",
            SessionStatus::Merged => "merged",
            SessionStatus::Cleanup => "cleanup",
            SessionStatus::NeedsInput => "needs_input",
            SessionStatus::Stuck => "stuck",
            SessionStatus::Errored => "errored",
            SessionStatus::Killed => "killed",
            SessionStatus::Terminated => "terminated",
            SessionStatus::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Runtime-observed liveness of the underlying process/terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Starting,
    Thinking,
    /// Alias historically called "working"; kept distinct from `SessionStatus::Working`.
    Active,
    WaitingInput,
    Blocked,
    Idle,
    Exited,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Activity::Starting => "starting",
            Activity::Thinking => "thinking",
            Activity::Active => "active",
            Activity::WaitingInput => "waiting_input",
            Activity::Blocked => "blocked",
            Activity::Idle => "idle",
            Activity::Exited => "exited",
        };
        write!(f, "{s}")
    }
}

/// Workflow stage, advanced only by the Phase Manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    PlanReview,
    Implementing,
    CodeReview,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Planning => "planning",
            Phase::PlanReview => "plan_review",
            Phase::Implementing => "implementing",
            Phase::CodeReview => "code_review",
            Phase::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Role of a reviewer sub-session spawned by the Phase Manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerRole {
    Architect,
    Developer,
    Product,
}

impl ReviewerRole {
    pub const ALL: [ReviewerRole; 3] = [
        ReviewerRole::Architect,
        ReviewerRole::Developer,
        ReviewerRole::Product,
    ];
}

impl fmt::Display for ReviewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewerRole::Architect => "architect",
            ReviewerRole::Developer => "developer",
            ReviewerRole::Product => "product",
        };
        write!(f, "{s}")
    }
}

/// Opaque handle into the owning Runtime plugin.
///
/// `data` is never interpreted by the core; only the runtime plugin that
/// created it knows what's inside. `None` means the runtime is dead, which
/// in turn forces `activity == Exited` (core invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeHandle {
    pub id: String,
    pub runtime_name: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

/// Agent-reported metadata about the session (summary, cost, identity).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub summary_is_fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<AgentCost>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentCost {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub usd: f64,
}

/// Links a reviewer sub-session back to its parent and round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubSessionInfo {
    pub parent_session_id: SessionId,
    pub role: ReviewerRole,
    pub phase: Phase,
    pub round: u32,
}

/// The central entity: one agent working one issue in one workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_path: Option<std::path::PathBuf>,
    pub status: SessionStatus,
    pub activity: Activity,
    pub phase: Phase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime_handle: Option<RuntimeHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_info: Option<AgentInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_session_info: Option<SubSessionInfo>,
    /// Flat string map — source of truth for `branch`, `pr`, `status`,
    /// `phase`, `reviewRound`, `issue`, etc. On reload, disk wins over any
    /// in-memory divergence from the typed fields above.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub created_at_ms: u64,
    pub last_activity_at_ms: u64,
}

impl Session {
    /// A terminal status forbids further state changes.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Core invariant: `runtime_handle = None` implies the runtime is dead.
    pub fn assert_runtime_invariant(&self) {
        debug_assert!(
            self.runtime_handle.is_some() || self.activity == Activity::Exited,
            "session {} has no runtime handle but activity is not Exited",
            self.id
        );
    }

    pub fn review_round(&self) -> u32 {
        self.metadata
            .get("reviewRound")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn set_review_round(&mut self, round: u32) {
        self.metadata
            .insert("reviewRound".to_string(), round.to_string());
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.metadata.insert("phase".to_string(), phase.to_string());
    }

    pub fn set_branch(&mut self, branch: impl Into<String>) {
        let branch = branch.into();
        self.metadata
            .insert("branch".to_string(), branch.clone());
        self.branch = Some(branch);
    }

    pub fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
        self.metadata
            .insert("status".to_string(), status.to_string());
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct SessionBuilder {
    session: Session,
}

#[cfg(any(test, feature = "test-support"))]
impl Session {
    pub fn builder(id: impl Into<String>, project_id: impl Into<String>) -> SessionBuilder {
        SessionBuilder {
            session: Session {
                id: SessionId::new(id.into()),
                project_id: ProjectId::new(project_id.into()),
                branch: None,
                issue_id: None,
                workspace_path: None,
                status: SessionStatus::Spawning,
                activity: Activity::Starting,
                phase: Phase::Planning,
                runtime_handle: None,
                agent_info: None,
                sub_session_info: None,
                metadata: HashMap::new(),
                created_at_ms: 0,
                last_activity_at_ms: 0,
            },
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl SessionBuilder {
    pub fn status(mut self, status: SessionStatus) -> Self {
        self.session.status = status;
        self
    }
    pub fn activity(mut self, activity: Activity) -> Self {
        self.session.activity = activity;
        self
    }
    pub fn phase(mut self, phase: Phase) -> Self {
        self.session.phase = phase;
        self
    }
    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.session.set_branch(branch);
        self
    }
    pub fn runtime_handle(mut self, handle: RuntimeHandle) -> Self {
        self.session.runtime_handle = Some(handle);
        self
    }
    pub fn sub_session_info(mut self, info: SubSessionInfo) -> Self {
        self.session.sub_session_info = Some(info);
        self
    }
    pub fn build(self) -> Session {
        self.session
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
