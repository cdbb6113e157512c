// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Converts between the typed `Session` entity and the flat `KEY=VALUE`
//! record the Metadata Store persists. `Session::metadata` is already the
//! source of truth for most fields (see its doc comment); this module's job
//! is keeping the typed fields and the flat map in sync on write, and
//! reconstructing the typed fields from the flat map on read.

use ao_core::{
    Activity, AgentCost, AgentInfo, Phase, ProjectId, ReviewerRole, RuntimeHandle, Session,
    SessionId, SessionStatus, SubSessionInfo,
};
use ao_storage::metadata::Record;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionDecodeError {
    #[error("session {session_id} metadata is missing required key {key}")]
    MissingField { session_id: String, key: &'static str },
    #[error("session {session_id} has invalid value {value:?} for key {key}")]
    InvalidField {
        session_id: String,
        key: &'static str,
        value: String,
    },
}

fn parse_status(s: &str) -> Option<SessionStatus> {
    use SessionStatus::*;
    Some(match s {
        "spawning" => Spawning,
        "working" => Working,
        "pr_open" => PrOpen,
        "ci_failed" => CiFailed,
        "review_pending" => ReviewPending,
        "changes_requested" => ChangesRequested,
        "approved" => Approved,
        "mergeable" => Mergeable,
        "merged" => Merged,
        "cleanup" => Cleanup,
        "needs_input" => NeedsInput,
        "stuck" => Stuck,
        "errored" => Errored,
        "killed" => Killed,
        "terminated" => Terminated,
        "done" => Done,
        _ => return None,
    })
}

fn parse_activity(s: &str) -> Option<Activity> {
    use Activity::*;
    Some(match s {
        "starting" => Starting,
        "thinking" => Thinking,
        "active" => Active,
        "waiting_input" => WaitingInput,
        "blocked" => Blocked,
        "idle" => Idle,
        "exited" => Exited,
        _ => return None,
    })
}

fn parse_phase(s: &str) -> Option<Phase> {
    use Phase::*;
    Some(match s {
        "planning" => Planning,
        "plan_review" => PlanReview,
        "implementing" => Implementing,
        "code_review" => CodeReview,
        "done" => Done,
        _ => return None,
    })
}

fn parse_reviewer_role(s: &str) -> Option<ReviewerRole> {
    use ReviewerRole::*;
    Some(match s {
        "architect" => Architect,
        "developer" => Developer,
        "product" => Product,
        _ => return None,
    })
}

/// Flattens a `Session` into the record the Metadata Store writes. Starts
/// from the session's own metadata map (preserving any plugin-added keys)
/// and overlays every typed field so the two can never drift.
pub fn record_from_session(session: &Session) -> Record {
    let mut record = session.metadata.clone();

    record.insert("status".to_string(), session.status.to_string());
    record.insert("phase".to_string(), session.phase.to_string());
    record.insert("activity".to_string(), session.activity.to_string());
    record.insert("project".to_string(), session.project_id.to_string());
    record.insert("createdAt".to_string(), session.created_at_ms.to_string());
    record.insert(
        "lastActivityAt".to_string(),
        session.last_activity_at_ms.to_string(),
    );

    match &session.branch {
        Some(branch) => {
            record.insert("branch".to_string(), branch.clone());
        }
        None => {
            record.remove("branch");
        }
    }
    match &session.issue_id {
        Some(issue) => {
            record.insert("issue".to_string(), issue.clone());
        }
        None => {
            record.remove("issue");
        }
    }
    match &session.workspace_path {
        Some(path) => {
            record.insert("worktree".to_string(), path.display().to_string());
        }
        None => {
            record.remove("worktree");
        }
    }

    for key in [
        "runtimeHandle.id",
        "runtimeHandle.runtimeName",
        "agentSessionId",
        "agentSummary",
        "cost.inputTokens",
        "cost.outputTokens",
        "cost.usd",
        "subSessionInfo.role",
        "subSessionInfo.parentSessionId",
        "subSessionInfo.phase",
        "subSessionInfo.round",
    ] {
        record.remove(key);
    }

    if let Some(handle) = &session.runtime_handle {
        record.insert("runtimeHandle.id".to_string(), handle.id.clone());
        record.insert(
            "runtimeHandle.runtimeName".to_string(),
            handle.runtime_name.clone(),
        );
    }

    if let Some(info) = &session.agent_info {
        if let Some(summary) = &info.summary {
            record.insert("agentSummary".to_string(), summary.clone());
        }
        if let Some(agent_session_id) = &info.agent_session_id {
            record.insert("agentSessionId".to_string(), agent_session_id.clone());
        }
        if let Some(cost) = &info.cost {
            record.insert(
                "cost.inputTokens".to_string(),
                cost.input_tokens.to_string(),
            );
            record.insert(
                "cost.outputTokens".to_string(),
                cost.output_tokens.to_string(),
            );
            record.insert("cost.usd".to_string(), cost.usd.to_string());
        }
    }

    if let Some(sub) = &session.sub_session_info {
        record.insert("subSessionInfo.role".to_string(), sub.role.to_string());
        record.insert(
            "subSessionInfo.parentSessionId".to_string(),
            sub.parent_session_id.to_string(),
        );
        record.insert("subSessionInfo.phase".to_string(), sub.phase.to_string());
        record.insert("subSessionInfo.round".to_string(), sub.round.to_string());
    }

    record
}

/// Reconstructs a `Session` from its persisted record. The full, unmodified
/// record is retained as `Session::metadata`, so unknown/plugin-added keys
/// survive a read-modify-write cycle untouched.
pub fn session_from_record(
    session_id: &SessionId,
    record: Record,
) -> Result<Session, SessionDecodeError> {
    let sid = session_id.as_str();

    let project_id = record
        .get("project")
        .ok_or(SessionDecodeError::MissingField {
            session_id: sid.to_string(),
            key: "project",
        })?;
    let project_id = ProjectId::new(project_id.clone());

    let status_raw = record
        .get("status")
        .ok_or(SessionDecodeError::MissingField {
            session_id: sid.to_string(),
            key: "status",
        })?;
    let status = parse_status(status_raw).ok_or_else(|| SessionDecodeError::InvalidField {
        session_id: sid.to_string(),
        key: "status",
        value: status_raw.clone(),
    })?;

    let activity = record
        .get("activity")
        .and_then(|v| parse_activity(v))
        .unwrap_or(Activity::Idle);
    let phase = record
        .get("phase")
        .and_then(|v| parse_phase(v))
        .unwrap_or(Phase::Planning);

    let branch = record.get("branch").cloned();
    let issue_id = record.get("issue").cloned();
    let workspace_path = record.get("worktree").map(PathBuf::from);

    let runtime_handle = match (
        record.get("runtimeHandle.id"),
        record.get("runtimeHandle.runtimeName"),
    ) {
        (Some(id), Some(runtime_name)) => Some(RuntimeHandle {
            id: id.clone(),
            runtime_name: runtime_name.clone(),
            data: Default::default(),
        }),
        _ => None,
    };

    let agent_info = {
        let summary = record.get("agentSummary").cloned();
        let agent_session_id = record.get("agentSessionId").cloned();
        let cost = match (
            record.get("cost.inputTokens"),
            record.get("cost.outputTokens"),
            record.get("cost.usd"),
        ) {
            (Some(input), Some(output), Some(usd)) => Some(AgentCost {
                input_tokens: input.parse().unwrap_or(0),
                output_tokens: output.parse().unwrap_or(0),
                usd: usd.parse().unwrap_or(0.0),
            }),
            _ => None,
        };
        if summary.is_some() || agent_session_id.is_some() || cost.is_some() {
            Some(AgentInfo {
                summary,
                summary_is_fallback: false,
                agent_session_id,
                cost,
            })
        } else {
            None
        }
    };

    let sub_session_info = match (
        record.get("subSessionInfo.parentSessionId"),
        record.get("subSessionInfo.role").and_then(|v| parse_reviewer_role(v)),
        record.get("subSessionInfo.phase").and_then(|v| parse_phase(v)),
        record.get("subSessionInfo.round").and_then(|v| v.parse().ok()),
    ) {
        (Some(parent), Some(role), Some(phase), Some(round)) => Some(SubSessionInfo {
            parent_session_id: SessionId::new(parent.clone()),
            role,
            phase,
            round,
        }),
        _ => None,
    };

    let created_at_ms = record
        .get("createdAt")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let last_activity_at_ms = record
        .get("lastActivityAt")
        .and_then(|v| v.parse().ok())
        .unwrap_or(created_at_ms);

    Ok(Session {
        id: session_id.clone(),
        project_id,
        branch,
        issue_id,
        workspace_path,
        status,
        activity,
        phase,
        runtime_handle,
        agent_info,
        sub_session_info,
        metadata: record,
        created_at_ms,
        last_activity_at_ms,
    })
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
