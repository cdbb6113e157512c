// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow-stage state machine: `planning -> plan_review -> implementing ->
//! code_review -> done`. Reads plan/review artifacts from the session's
//! workspace and reports which reviewer sub-sessions still need spawning;
//! actually spawning them and writing `metadata.phase`/`metadata.reviewRound`
//! back to the session is the Session Manager's job, kept out of this crate
//! module so `check` stays a pure function over its inputs.

use ao_core::{Phase, ReviewerRole, Session, SessionId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactReviewDecision {
    Approved,
    ChangesRequested,
}

/// Result of one `PhaseManager::check` call. `changed` is true when `phase`
/// differs from the session's current phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseCheckResult {
    pub phase: Phase,
    pub review_round: u32,
    pub roles_to_spawn: Vec<ReviewerRole>,
    pub changed: bool,
}

impl PhaseCheckResult {
    fn unchanged(phase: Phase, review_round: u32) -> Self {
        Self {
            phase,
            review_round,
            roles_to_spawn: Vec::new(),
            changed: false,
        }
    }
}

/// Reads the on-disk phase artifacts: `workspacePath/.ao/plan.md` and
/// `workspacePath/.ao/reviews/<phase>-<round>-<role>.md`.
#[async_trait]
pub trait PhaseArtifactReader: Send + Sync {
    async fn plan_exists(&self, workspace_path: &Path) -> bool;

    async fn review_decision(
        &self,
        workspace_path: &Path,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
    ) -> Option<ArtifactReviewDecision>;
}

/// Tells the Phase Manager whether a reviewer sub-session is already live
/// for `(parent, phase, round, role)`, so the spawn step stays idempotent.
pub trait SubSessionQuery: Send + Sync {
    fn has_live_reviewer(
        &self,
        parent: &SessionId,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
    ) -> bool;
}

fn parse_decision_field(content: &str) -> Option<ArtifactReviewDecision> {
    for line in content.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once([':', '=']) else {
            continue;
        };
        if !key.trim().eq_ignore_ascii_case("decision") {
            continue;
        }
        let value = value.trim().trim_matches(['"', '\'', ',']);
        return match value {
            "approved" => Some(ArtifactReviewDecision::Approved),
            "changes_requested" => Some(ArtifactReviewDecision::ChangesRequested),
            _ => None,
        };
    }
    None
}

/// Filesystem-backed artifact reader used in production.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsPhaseArtifactReader;

#[async_trait]
impl PhaseArtifactReader for FsPhaseArtifactReader {
    async fn plan_exists(&self, workspace_path: &Path) -> bool {
        tokio::fs::try_exists(workspace_path.join(".ao/plan.md"))
            .await
            .unwrap_or(false)
    }

    async fn review_decision(
        &self,
        workspace_path: &Path,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
    ) -> Option<ArtifactReviewDecision> {
        let path = workspace_path
            .join(".ao/reviews")
            .join(format!("{phase}-{round}-{role}.md"));
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        parse_decision_field(&content)
    }
}

/// Drives the workflow-stage state machine for one session. Stateless: all
/// state lives in the session record and the workspace artifacts.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhaseManager;

impl PhaseManager {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates the session's current phase against its artifacts and
    /// returns the (possibly unchanged) next phase. `simple_mode` short
    /// circuits the whole state machine, per `project.workflow.mode ==
    /// "simple"`. `code_ready` and `auto_review_enabled` come from the SCM
    /// plugin and project config respectively, not from the workspace.
    pub async fn check(
        &self,
        session: &Session,
        workspace_path: &Path,
        simple_mode: bool,
        code_ready: bool,
        auto_review_enabled: bool,
        reader: &dyn PhaseArtifactReader,
        query: &dyn SubSessionQuery,
    ) -> PhaseCheckResult {
        if simple_mode {
            return PhaseCheckResult::unchanged(session.phase, session.review_round());
        }

        match session.phase {
            Phase::Planning => {
                if reader.plan_exists(workspace_path).await {
                    PhaseCheckResult {
                        phase: Phase::PlanReview,
                        review_round: 1,
                        roles_to_spawn: Vec::new(),
                        changed: true,
                    }
                } else {
                    PhaseCheckResult::unchanged(Phase::Planning, session.review_round())
                }
            }
            Phase::PlanReview => {
                self.check_review_gate(
                    session,
                    Phase::PlanReview,
                    Phase::Implementing,
                    Phase::Planning,
                    workspace_path,
                    reader,
                    query,
                )
                .await
            }
            Phase::Implementing => {
                if code_ready && auto_review_enabled {
                    PhaseCheckResult {
                        phase: Phase::CodeReview,
                        review_round: 1,
                        roles_to_spawn: Vec::new(),
                        changed: true,
                    }
                } else {
                    PhaseCheckResult::unchanged(Phase::Implementing, session.review_round())
                }
            }
            Phase::CodeReview => {
                self.check_review_gate(
                    session,
                    Phase::CodeReview,
                    Phase::Done,
                    Phase::Implementing,
                    workspace_path,
                    reader,
                    query,
                )
                .await
            }
            Phase::Done => PhaseCheckResult::unchanged(Phase::Done, session.review_round()),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn check_review_gate(
        &self,
        session: &Session,
        current_phase: Phase,
        advance_to: Phase,
        regress_to: Phase,
        workspace_path: &Path,
        reader: &dyn PhaseArtifactReader,
        query: &dyn SubSessionQuery,
    ) -> PhaseCheckResult {
        let round = session.review_round().max(1);
        let mut decisions: HashMap<ReviewerRole, ArtifactReviewDecision> = HashMap::new();
        for role in ReviewerRole::ALL {
            if let Some(decision) = reader
                .review_decision(workspace_path, current_phase, round, role)
                .await
            {
                decisions.insert(role, decision);
            }
        }

        if decisions
            .values()
            .any(|d| *d == ArtifactReviewDecision::ChangesRequested)
        {
            return PhaseCheckResult {
                phase: regress_to,
                review_round: round + 1,
                roles_to_spawn: Vec::new(),
                changed: true,
            };
        }

        if decisions.len() == ReviewerRole::ALL.len() {
            return PhaseCheckResult {
                phase: advance_to,
                review_round: round,
                roles_to_spawn: Vec::new(),
                changed: true,
            };
        }

        let roles_to_spawn: Vec<ReviewerRole> = ReviewerRole::ALL
            .into_iter()
            .filter(|role| !decisions.contains_key(role))
            .filter(|role| !query.has_live_reviewer(&session.id, current_phase, round, *role))
            .collect();

        PhaseCheckResult {
            phase: current_phase,
            review_round: round,
            roles_to_spawn,
            changed: false,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct FakePhaseArtifactReader {
    plan_exists: bool,
    decisions: HashMap<(Phase, u32, ReviewerRole), ArtifactReviewDecision>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakePhaseArtifactReader {
    pub fn new() -> Self {
        Self {
            plan_exists: false,
            decisions: HashMap::new(),
        }
    }

    pub fn set_plan_exists(&mut self, exists: bool) {
        self.plan_exists = exists;
    }

    pub fn set_decision(
        &mut self,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
        decision: ArtifactReviewDecision,
    ) {
        self.decisions.insert((phase, round, role), decision);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakePhaseArtifactReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
#[async_trait]
impl PhaseArtifactReader for FakePhaseArtifactReader {
    async fn plan_exists(&self, _workspace_path: &Path) -> bool {
        self.plan_exists
    }

    async fn review_decision(
        &self,
        _workspace_path: &Path,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
    ) -> Option<ArtifactReviewDecision> {
        self.decisions.get(&(phase, round, role)).copied()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct FakeSubSessionQuery {
    live: std::collections::HashSet<(SessionId, Phase, u32, ReviewerRole)>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeSubSessionQuery {
    pub fn new() -> Self {
        Self {
            live: std::collections::HashSet::new(),
        }
    }

    pub fn mark_live(&mut self, parent: SessionId, phase: Phase, round: u32, role: ReviewerRole) {
        self.live.insert((parent, phase, round, role));
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeSubSessionQuery {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl SubSessionQuery for FakeSubSessionQuery {
    fn has_live_reviewer(
        &self,
        parent: &SessionId,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
    ) -> bool {
        self.live
            .contains(&(parent.clone(), phase, round, role))
    }
}

#[cfg(test)]
#[path = "phase_manager_tests.rs"]
mod tests;
