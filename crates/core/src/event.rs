// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `OrchestratorEvent` and the taxonomy emitted by the core onto the Event
//! Bus, consumed by notifiers and the SSE publisher (SSE itself is an
//! external collaborator; this crate only defines the wire shape).

use crate::id::{ProjectId, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Severity/routing priority for an event, used by the Reaction Engine to
/// pick the right notifier fan-out and by the CLI to choose action buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPriority {
    Info,
    Warning,
    Action,
    Urgent,
}

/// The fixed event taxonomy from the core spec — every event the Session
/// Manager, Phase Manager, or Reaction Engine can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SessionSpawned,
    SessionMessageSent,
    SessionKilled,
    SessionExited,
    SessionRateLimited,
    SessionCycleDetected,
    PhaseTransitioned,
    ReviewRequested,
    ReviewCompleted,
    PrOpened,
    PrCiFailed,
    PrChangesRequested,
    PrMergeable,
    PrMerged,
    EscalationRequired,
}

impl EventType {
    /// Default priority for an event type absent any configured override.
    pub fn default_priority(self) -> EventPriority {
        use EventType::*;
        match self {
            EscalationRequired | SessionCycleDetected => EventPriority::Urgent,
            PrCiFailed | PrChangesRequested | SessionRateLimited => EventPriority::Action,
            PrMergeable | PrMerged | ReviewRequested | ReviewCompleted => EventPriority::Action,
            SessionKilled | SessionExited => EventPriority::Warning,
            _ => EventPriority::Info,
        }
    }
}

/// A single orchestrator event, published on the in-process Event Bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub priority: EventPriority,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<SessionId>,
    pub timestamp_ms: u64,
    pub message: String,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
}

impl OrchestratorEvent {
    pub fn new(
        id: impl Into<String>,
        event_type: EventType,
        project_id: ProjectId,
        timestamp_ms: u64,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            event_type,
            priority: event_type.default_priority(),
            project_id,
            session_id: None,
            timestamp_ms,
            message: message.into(),
            data: HashMap::new(),
        }
    }

    pub fn with_session(mut self, session_id: SessionId) -> Self {
        self.session_id = Some(session_id);
        self
    }

    pub fn with_priority(mut self, priority: EventPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_data(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
