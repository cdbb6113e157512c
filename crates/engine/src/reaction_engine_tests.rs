use super::*;
use crate::session_manager::SpawnRequest;
use ao_adapters::agent::FakeAgentAdapter;
use ao_adapters::notifier::{FakeNotifyAdapter, NotifyCall};
use ao_adapters::runtime::FakeRuntimeAdapter;
use ao_adapters::workspace::FakeWorkspaceAdapter;
use ao_core::{FakeClock, ProjectId, SequentialIdGen};
use chrono::Utc;
use std::sync::Mutex as StdMutex;
use tempfile::TempDir;

struct CollectingSubscriber {
    events: StdMutex<Vec<OrchestratorEvent>>,
}

impl CollectingSubscriber {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: StdMutex::new(Vec::new()),
        })
    }

    fn events(&self) -> Vec<OrchestratorEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &OrchestratorEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Harness {
    _dir: TempDir,
    manager: Arc<SessionManager>,
    event_bus: Arc<EventBus>,
    clock: Arc<dyn Clock>,
    project_id: ProjectId,
}

fn harness() -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(Utc::now()));
    let mut registry = PluginRegistry::new();
    registry.register_runtime("tmux", "fake tmux runtime", Arc::new(FakeRuntimeAdapter::new()));
    registry.register_agent("claude", "fake claude agent", Arc::new(FakeAgentAdapter::new("claude")));
    registry.register_workspace("git-worktree", "fake workspace", Arc::new(FakeWorkspaceAdapter::new()));
    let registry = Arc::new(registry);

    let metadata = Arc::new(ao_storage::MetadataStore::new(dir.path().join("sessions")));
    let worker_pool = Arc::new(crate::worker_pool::WorkerPool::new(10, 5));
    let rate_limit = Arc::new(crate::rate_limit::RateLimitTracker::new(clock.clone()));
    let cycle_detector = Arc::new(crate::cycle_detector::CycleDetector::new());
    let event_bus = Arc::new(EventBus::new());
    let id_gen = Arc::new(SequentialIdGen::new());

    let manager = Arc::new(SessionManager::new(
        clock.clone(),
        registry,
        metadata,
        worker_pool,
        rate_limit,
        cycle_detector,
        event_bus.clone(),
        id_gen,
    ));

    let project_id = ProjectId::new("proj".to_string());
    manager.register_project(
        project_id.clone(),
        crate::session_manager::ProjectPluginConfig {
            repo_path: dir.path().join("repo"),
            runtime: "tmux".to_string(),
            agent: "claude".to_string(),
            workspace: "git-worktree".to_string(),
            tracker: None,
            scm: None,
            simple_mode: true,
            auto_review_enabled: false,
        },
    );

    Harness {
        _dir: dir,
        manager,
        event_bus,
        clock,
        project_id,
    }
}

fn source_event(project_id: &ProjectId, session_id: &SessionId) -> OrchestratorEvent {
    OrchestratorEvent::new("src-1", EventType::PrCiFailed, project_id.clone(), 0, "build failed")
        .with_session(session_id.clone())
}

#[test]
fn reaction_table_skips_informational_events() {
    assert!(reaction_for(EventType::SessionSpawned).is_none());
    assert!(reaction_for(EventType::SessionMessageSent).is_none());
    assert!(reaction_for(EventType::PhaseTransitioned).is_none());
    assert!(reaction_for(EventType::PrOpened).is_none());
}

#[test]
fn reaction_table_sends_to_agent_for_ci_and_review_feedback() {
    assert_eq!(reaction_for(EventType::PrCiFailed).unwrap().action, ActionKind::SendToAgent);
    assert_eq!(reaction_for(EventType::PrChangesRequested).unwrap().action, ActionKind::SendToAgent);
}

#[test]
fn reaction_table_notifies_for_human_facing_events() {
    for event_type in [
        EventType::EscalationRequired,
        EventType::SessionCycleDetected,
        EventType::SessionRateLimited,
        EventType::PrMergeable,
        EventType::PrMerged,
        EventType::ReviewRequested,
        EventType::ReviewCompleted,
        EventType::SessionKilled,
        EventType::SessionExited,
    ] {
        assert_eq!(reaction_for(event_type).unwrap().action, ActionKind::Notify, "{event_type:?}");
    }
}

#[test]
fn notify_buttons_offer_merge_action_for_mergeable_prs() {
    let buttons = notify_buttons(EventType::PrMergeable);
    assert_eq!(buttons.len(), 1);
    assert_eq!(buttons[0].label, "Merge");
}

#[test]
fn notify_buttons_are_empty_for_events_with_no_obvious_action() {
    assert!(notify_buttons(EventType::SessionKilled).is_empty());
}

#[test]
fn debounce_suppresses_repeat_firing_for_the_same_transition() {
    let h = harness();
    let engine = ReactionEngine::new(h.manager.clone(), Arc::new(PluginRegistry::new()), h.event_bus.clone(), h.clock.clone());
    let session_id = SessionId::new("s1");
    let key = (session_id, EventType::PrCiFailed);
    let value = (SessionStatus::CiFailed, Activity::Idle);

    assert!(engine.should_fire(key.clone(), value));
    assert!(!engine.should_fire(key.clone(), value), "repeat of the same transition should be suppressed");
    assert!(engine.should_fire(key, (SessionStatus::Working, Activity::Active)), "a changed transition should fire again");
}

#[tokio::test(start_paused = true)]
async fn send_to_agent_retries_then_escalates_once() {
    let h = harness();
    let subscriber = CollectingSubscriber::new();
    h.event_bus.subscribe(subscriber.clone());

    let session = h
        .manager
        .spawn(SpawnRequest::new(h.project_id.clone()))
        .await
        .expect("spawn should succeed");
    // Killing drops the runtime handle, so every subsequent `send` fails
    // with `RuntimeDead` — a deterministic stand-in for a runtime that
    // keeps failing transiently.
    h.manager.kill(&session.id, None).await.expect("kill should succeed");

    let event = source_event(&h.project_id, &session.id);
    send_to_agent_with_retry(
        h.manager.clone(),
        h.event_bus.clone(),
        h.clock.clone(),
        session.id.clone(),
        event,
        "please fix it".to_string(),
        3,
        2,
    )
    .await;

    let events = subscriber.events();
    let escalations: Vec<_> = events.iter().filter(|e| e.event_type == EventType::EscalationRequired).collect();
    assert_eq!(escalations.len(), 1, "should escalate exactly once after the configured failure count");
    assert_eq!(escalations[0].session_id.as_ref(), Some(&session.id));
}

#[tokio::test]
async fn notify_fan_out_dispatches_to_every_registered_notifier() {
    let mut registry = PluginRegistry::new();
    let first = Arc::new(FakeNotifyAdapter::new());
    let second = Arc::new(FakeNotifyAdapter::new());
    registry.register_notifier("desktop", "fake desktop", first.clone());
    registry.register_notifier("webhook", "fake webhook", second.clone());
    let registry = Arc::new(registry);

    let event = OrchestratorEvent::new("e1", EventType::PrMergeable, ProjectId::new("proj"), 0, "ready to merge");
    notify_fan_out(registry, event, notify_buttons(EventType::PrMergeable)).await;

    assert!(matches!(first.calls().as_slice(), [NotifyCall::NotifyWithActions { action_count: 1, .. }]));
    assert!(matches!(second.calls().as_slice(), [NotifyCall::NotifyWithActions { action_count: 1, .. }]));
}
