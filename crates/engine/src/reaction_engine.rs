// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Reaction Engine: turns high-signal events into follow-up action —
//! nudging the agent, notifying a human, or escalating after repeated
//! failure. Subscribes to the Event Bus, but `EventSubscriber::on_event` is
//! synchronous and the real work (`SessionManager::send`, notifier
//! fan-out) is async, so `on_event` only decides whether to act and hands
//! the actual work to a spawned task.
//!
//! There is no reaction config file (out of scope); the event-type to
//! action table below is fixed, matching each event's `default_priority()`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use ao_adapters::notifier::NotifyAction;
use ao_adapters::{PluginRegistry, Slot};
use ao_core::{Activity, Clock, EventPriority, EventType, OrchestratorEvent, SessionId, SessionStatus};
use parking_lot::Mutex;

use crate::event_bus::{EventBus, EventSubscriber};
use crate::session_manager::SessionManager;

const BASE_BACKOFF: Duration = Duration::from_secs(30);
const MAX_BACKOFF: Duration = Duration::from_secs(600);
const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    SendToAgent,
    Notify,
}

#[derive(Debug, Clone, Copy)]
struct ReactionSpec {
    action: ActionKind,
    retries: u32,
    escalate_after: u32,
}

impl ReactionSpec {
    const fn send_to_agent() -> Self {
        Self {
            action: ActionKind::SendToAgent,
            retries: 3,
            escalate_after: 3,
        }
    }

    const fn notify() -> Self {
        Self {
            action: ActionKind::Notify,
            retries: 0,
            escalate_after: 0,
        }
    }
}

/// The built-in event -> reaction mapping. `SessionSpawned`, `SessionMessageSent`,
/// `PhaseTransitioned`, and `PrOpened` are informational only and have no
/// configured reaction.
fn reaction_for(event_type: EventType) -> Option<ReactionSpec> {
    use EventType::*;
    match event_type {
        PrCiFailed | PrChangesRequested => Some(ReactionSpec::send_to_agent()),
        EscalationRequired | SessionCycleDetected | SessionRateLimited | PrMergeable | PrMerged
        | ReviewRequested | ReviewCompleted | SessionKilled | SessionExited => Some(ReactionSpec::notify()),
        SessionSpawned | SessionMessageSent | PhaseTransitioned | PrOpened => None,
    }
}

fn canonical_message(event: &OrchestratorEvent) -> String {
    match event.event_type {
        EventType::PrCiFailed => format!("CI failed: {}. Please investigate and push a fix.", event.message),
        EventType::PrChangesRequested => {
            format!("Changes were requested on review: {}. Please address the feedback.", event.message)
        }
        _ => event.message.clone(),
    }
}

fn notify_buttons(event_type: EventType) -> Vec<NotifyAction> {
    match event_type {
        EventType::PrMergeable => vec![NotifyAction {
            label: "Merge".to_string(),
            command: "pr merge".to_string(),
        }],
        EventType::SessionCycleDetected => vec![
            NotifyAction {
                label: "Kill".to_string(),
                command: "kill".to_string(),
            },
            NotifyAction {
                label: "Restart".to_string(),
                command: "restore".to_string(),
            },
        ],
        EventType::ReviewRequested => vec![NotifyAction {
            label: "View".to_string(),
            command: "show".to_string(),
        }],
        _ => Vec::new(),
    }
}

type DebounceKey = (SessionId, EventType);
type DebounceValue = (SessionStatus, Activity);

/// Subscribes to the Event Bus and reacts to the events it's configured
/// for. Edge-triggered: a given `(session, event type)` pair fires at most
/// once per session status/activity transition, so repeated polls that
/// keep observing the same stuck state don't re-fire the reaction.
pub struct ReactionEngine {
    manager: Arc<SessionManager>,
    registry: Arc<PluginRegistry>,
    event_bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    debounce: Mutex<HashMap<DebounceKey, DebounceValue>>,
}

impl ReactionEngine {
    pub fn new(manager: Arc<SessionManager>, registry: Arc<PluginRegistry>, event_bus: Arc<EventBus>, clock: Arc<dyn Clock>) -> Self {
        Self {
            manager,
            registry,
            event_bus,
            clock,
            debounce: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true (and records the transition) the first time this key is
    /// seen for a given debounce value; returns true again once the value
    /// has since changed. A repeat of the same value is suppressed.
    fn should_fire(&self, key: DebounceKey, value: DebounceValue) -> bool {
        let mut debounce = self.debounce.lock();
        if debounce.get(&key) == Some(&value) {
            return false;
        }
        debounce.insert(key, value);
        true
    }
}

impl EventSubscriber for ReactionEngine {
    fn on_event(&self, event: &OrchestratorEvent) {
        let Some(spec) = reaction_for(event.event_type) else {
            return;
        };
        let Some(session_id) = event.session_id.clone() else {
            return;
        };
        let Some(session) = self.manager.get(&session_id) else {
            return;
        };

        let key = (session_id.clone(), event.event_type);
        if !self.should_fire(key, (session.status, session.activity)) {
            return;
        }

        match spec.action {
            ActionKind::SendToAgent => {
                let manager = self.manager.clone();
                let event_bus = self.event_bus.clone();
                let clock = self.clock.clone();
                let message = canonical_message(event);
                let event = event.clone();
                tokio::spawn(send_to_agent_with_retry(
                    manager,
                    event_bus,
                    clock,
                    session_id,
                    event,
                    message,
                    spec.retries,
                    spec.escalate_after,
                ));
            }
            ActionKind::Notify => {
                let registry = self.registry.clone();
                let buttons = notify_buttons(event.event_type);
                let event = event.clone();
                tokio::spawn(notify_fan_out(registry, event, buttons));
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn send_to_agent_with_retry(
    manager: Arc<SessionManager>,
    event_bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    session_id: SessionId,
    source_event: OrchestratorEvent,
    message: String,
    retries: u32,
    escalate_after: u32,
) {
    let mut backoff = BASE_BACKOFF;
    let mut escalated = false;
    let attempts = retries.max(1);

    for attempt in 1..=attempts {
        match manager.send(&session_id, &message).await {
            Ok(()) => return,
            Err(err) => {
                tracing::warn!(session_id = %session_id, attempt, error = %err, "send-to-agent reaction failed");
                if attempt >= escalate_after && !escalated {
                    publish_escalation(
                        &event_bus,
                        &clock,
                        &source_event,
                        format!("send-to-agent failed after {attempt} attempt(s): {err}"),
                    );
                    escalated = true;
                }
                if attempt == attempts {
                    break;
                }
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
            }
        }
    }
}

/// A slow notifier must never stall the reconciliation loop; each notifier
/// gets its own timeout and a hang in one does not delay the others.
async fn notify_fan_out(registry: Arc<PluginRegistry>, event: OrchestratorEvent, buttons: Vec<NotifyAction>) {
    let names: Vec<String> = registry.list(Slot::Notifier).into_iter().map(|m| m.name.clone()).collect();
    for name in names {
        let Some(notifier) = registry.notifier(&name) else {
            continue;
        };
        match tokio::time::timeout(NOTIFY_TIMEOUT, notifier.notify_with_actions(&event, &buttons)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(notifier = %name, event_type = ?event.event_type, error = %err, "notifier fan-out failed");
            }
            Err(_) => {
                tracing::warn!(notifier = %name, event_type = ?event.event_type, "notifier fan-out timed out");
            }
        }
    }
}

fn publish_escalation(event_bus: &Arc<EventBus>, clock: &Arc<dyn Clock>, source: &OrchestratorEvent, reason: impl Into<String>) {
    let id = format!("escalation-{}-{}", source.id, clock.epoch_ms());
    let mut escalation = OrchestratorEvent::new(id, EventType::EscalationRequired, source.project_id.clone(), clock.epoch_ms(), reason)
        .with_priority(EventPriority::Urgent);
    if let Some(session_id) = &source.session_id {
        escalation = escalation.with_session(session_id.clone());
    }
    event_bus.publish(escalation);
}

#[cfg(test)]
#[path = "reaction_engine_tests.rs"]
mod tests;
