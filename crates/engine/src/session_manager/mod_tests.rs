use super::*;
use ao_adapters::agent::FakeAgentAdapter;
use ao_adapters::runtime::FakeRuntimeAdapter;
use ao_adapters::scm::FakeScmAdapter;
use ao_adapters::tracker::FakeTrackerAdapter;
use ao_adapters::workspace::FakeWorkspaceAdapter;
use ao_core::{CiCheck, CiStatus, FakeClock, Issue, IssueState, PrInfo, ReviewDecision, SequentialIdGen};
use chrono::Utc;
use std::sync::Mutex as StdMutex;
use tempfile::TempDir;

struct CollectingSubscriber {
    events: StdMutex<Vec<ao_core::OrchestratorEvent>>,
}

impl CollectingSubscriber {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: StdMutex::new(Vec::new()),
        })
    }

    fn events(&self) -> Vec<ao_core::OrchestratorEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl crate::event_bus::EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &ao_core::OrchestratorEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

struct Harness {
    _dir: TempDir,
    manager: Arc<SessionManager>,
    runtime: Arc<FakeRuntimeAdapter>,
    agent: Arc<FakeAgentAdapter>,
    workspace: Arc<FakeWorkspaceAdapter>,
    scm: Arc<FakeScmAdapter>,
    tracker: Arc<FakeTrackerAdapter>,
    subscriber: Arc<CollectingSubscriber>,
    project_id: ProjectId,
}

fn harness() -> Harness {
    harness_with_mode(true)
}

fn harness_with_mode(simple_mode: bool) -> Harness {
    let dir = TempDir::new().expect("tempdir");
    let clock: Arc<dyn Clock> = Arc::new(FakeClock::new(Utc::now()));
    let mut registry = PluginRegistry::new();

    let runtime = Arc::new(FakeRuntimeAdapter::new());
    let agent = Arc::new(FakeAgentAdapter::new("claude"));
    let workspace = Arc::new(FakeWorkspaceAdapter::new());
    let scm = Arc::new(FakeScmAdapter::new());
    let tracker = Arc::new(FakeTrackerAdapter::new());

    registry.register_runtime("tmux", "fake tmux runtime", runtime.clone());
    registry.register_agent("claude", "fake claude agent", agent.clone());
    registry.register_workspace("git-worktree", "fake workspace", workspace.clone());
    registry.register_scm("github", "fake scm", scm.clone());
    registry.register_tracker("linear", "fake tracker", tracker.clone());

    let registry = Arc::new(registry);
    let metadata = Arc::new(MetadataStore::new(dir.path().join("sessions")));
    let worker_pool = Arc::new(WorkerPool::new(10, 5));
    let rate_limit = Arc::new(RateLimitTracker::new(clock.clone()));
    let cycle_detector = Arc::new(CycleDetector::new());
    let event_bus = Arc::new(EventBus::new());
    let subscriber = CollectingSubscriber::new();
    event_bus.subscribe(subscriber.clone());
    let id_gen = Arc::new(SequentialIdGen::new());

    let manager = Arc::new(SessionManager::new(
        clock,
        registry,
        metadata,
        worker_pool,
        rate_limit,
        cycle_detector,
        event_bus,
        id_gen,
    ));

    let project_id = ProjectId::new("proj".to_string());
    manager.register_project(
        project_id.clone(),
        ProjectPluginConfig {
            repo_path: dir.path().join("repo"),
            runtime: "tmux".to_string(),
            agent: "claude".to_string(),
            workspace: "git-worktree".to_string(),
            tracker: None,
            scm: Some("github".to_string()),
            simple_mode,
            auto_review_enabled: false,
        },
    );

    Harness {
        _dir: dir,
        manager,
        runtime,
        agent,
        workspace,
        scm,
        tracker,
        subscriber,
        project_id,
    }
}

fn pr(number: u64) -> PrInfo {
    PrInfo {
        number,
        url: format!("https://example.com/pr/{number}"),
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        head_branch: "feature".to_string(),
        base_branch: "main".to_string(),
        draft: false,
        additions: 1,
        deletions: 0,
        ci_checks: vec![CiCheck {
            name: "ci".to_string(),
            status: CiStatus::Passing,
            url: None,
        }],
        review_decision: ReviewDecision::Approved,
        mergeable: true,
        merged: false,
        closed: false,
        unresolved_comment_count: 0,
    }
}

#[tokio::test]
async fn spawn_denied_when_admission_refuses() {
    let h = harness();
    h.manager.worker_pool.clear();
    for _ in 0..10 {
        h.manager
            .worker_pool
            .record_spawn(&h.project_id, &SessionId::new(format!("filler-{}", uuid::Uuid::new_v4())));
    }

    let err = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("do the thing".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SessionManagerError::SpawnDenied { .. }));
}

#[tokio::test]
async fn spawn_success_persists_and_records_worker() {
    let h = harness();
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("do the thing".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");

    assert_eq!(session.status, SessionStatus::Spawning);
    assert!(session.runtime_handle.is_some());
    assert_eq!(h.manager.worker_pool.get_status().global_active, 1);

    let stored = h.manager.metadata.read_raw(session.id.as_str()).unwrap().unwrap();
    assert_eq!(stored.get("status").map(String::as_str), Some("spawning"));

    let events = h.subscriber.events();
    assert!(events
        .iter()
        .any(|e| e.event_type == EventType::SessionSpawned));

    assert_eq!(h.workspace.calls().len(), 1);
}

#[tokio::test]
async fn send_touches_last_activity_and_forwards_to_runtime() {
    let h = harness();
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    let before = session.last_activity_at_ms;

    h.manager.send(&session.id, "keep going").await.expect("send");

    let updated = h.manager.get(&session.id).expect("session");
    assert!(updated.last_activity_at_ms >= before);

    let calls = h.runtime.calls();
    assert!(calls.iter().any(|c| matches!(
        c,
        ao_adapters::runtime::RuntimeCall::SendMessage { message, .. } if message == "keep going"
    )));
}

#[tokio::test]
async fn kill_is_idempotent_and_releases_worker_slot() {
    let h = harness();
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    assert_eq!(h.manager.worker_pool.get_status().global_active, 1);

    let killed = h.manager.kill(&session.id, Some("no longer needed")).await.expect("kill");
    assert_eq!(killed.status, SessionStatus::Killed);
    assert_eq!(h.manager.worker_pool.get_status().global_active, 0);

    let killed_again = h.manager.kill(&session.id, Some("again")).await.expect("kill again");
    assert_eq!(killed_again.status, SessionStatus::Killed);
    assert_eq!(h.manager.worker_pool.get_status().global_active, 0);
}

#[tokio::test]
async fn reconcile_marks_dead_runtime_with_no_pr_as_errored() {
    let h = harness();
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");

    let handle_id = session.runtime_handle.as_ref().unwrap().id.clone();
    h.runtime.set_alive(&handle_id, false);

    h.manager.poll().await;

    let reconciled = h.manager.get(&session.id).expect("session");
    assert_eq!(reconciled.activity, Activity::Exited);
    assert_eq!(reconciled.status, SessionStatus::Errored);
}

#[tokio::test]
async fn reconcile_detects_mergeable_pr_and_emits_event() {
    let h = harness();
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");

    h.agent.set_activity(Activity::Active);
    h.scm.set_pr_for_session(session.id.as_str(), pr(42));

    h.manager.poll().await;

    let reconciled = h.manager.get(&session.id).expect("session");
    assert_eq!(reconciled.status, SessionStatus::Mergeable);

    let events = h.subscriber.events();
    assert!(events.iter().any(|e| e.event_type == EventType::PrMergeable));
}

#[tokio::test]
async fn spawn_reviewer_reuses_parent_workspace_instead_of_cutting_a_new_one() {
    let h = harness();
    let parent = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    assert_eq!(h.workspace.calls().len(), 1);

    let reviewer = h
        .manager
        .spawn_reviewer(&parent, Phase::PlanReview, 1, ReviewerRole::Architect)
        .await
        .expect("spawn_reviewer");

    assert_eq!(reviewer.workspace_path, parent.workspace_path);
    assert_eq!(h.workspace.calls().len(), 1, "no new workspace should be cut for a reviewer");

    let info = reviewer.sub_session_info.expect("sub_session_info");
    assert_eq!(info.parent_session_id, parent.id);
    assert_eq!(info.role, ReviewerRole::Architect);
    assert_eq!(info.phase, Phase::PlanReview);
    assert_eq!(info.round, 1);

    assert_eq!(h.manager.worker_pool.get_status().global_active, 2);
}

#[tokio::test]
async fn spawn_reviewer_fails_when_parent_has_no_workspace() {
    let h = harness();
    let mut parent = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    parent.workspace_path = None;

    let err = h
        .manager
        .spawn_reviewer(&parent, Phase::PlanReview, 1, ReviewerRole::Architect)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionManagerError::NoWorkspace(id) if id == parent.id.to_string()));
}

#[tokio::test]
async fn reconcile_spawns_missing_reviewers_once_a_plan_is_pending_review() {
    let h = harness_with_mode(false);
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");

    {
        let mut sessions = h.manager.sessions.lock();
        let slot = sessions.get_mut(&session.id).expect("session in cache");
        slot.set_phase(Phase::PlanReview);
        slot.set_review_round(1);
    }

    h.manager.poll().await;

    let all = h.manager.list_all(Some(&h.project_id));
    let reviewers: Vec<_> = all
        .iter()
        .filter(|s| s.sub_session_info.is_some())
        .collect();
    assert_eq!(reviewers.len(), 3, "one reviewer per role should be spawned");
    for role in ReviewerRole::ALL {
        assert!(reviewers
            .iter()
            .any(|s| s.sub_session_info.as_ref().unwrap().role == role));
    }

    let events = h.subscriber.events();
    assert_eq!(
        events.iter().filter(|e| e.event_type == EventType::ReviewRequested).count(),
        3
    );

    // A second tick must not spawn duplicates: the live reviewers already
    // satisfy the round, so `roles_to_spawn` comes back empty.
    h.manager.poll().await;
    let all_again = h.manager.list_all(Some(&h.project_id));
    assert_eq!(
        all_again.iter().filter(|s| s.sub_session_info.is_some()).count(),
        3,
        "reviewer spawns must be idempotent per (session, phase, round, role)"
    );
}

#[tokio::test]
async fn reconcile_emits_review_completed_when_a_review_gate_resolves() {
    let h = harness_with_mode(false);
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");

    // `FakeWorkspaceAdapter` hands back a path under `/fake-workspaces`
    // that isn't actually on disk; point the session at a real tempdir so
    // `FsPhaseArtifactReader` can read the review verdicts written below.
    let workspace_dir = TempDir::new().expect("tempdir");
    tokio::fs::create_dir_all(workspace_dir.path().join(".ao/reviews"))
        .await
        .expect("mkdir");
    for role in ReviewerRole::ALL {
        tokio::fs::write(
            workspace_dir.path().join(".ao/reviews").join(format!("plan_review-1-{role}.md")),
            "decision: approved\n",
        )
        .await
        .expect("write verdict");
    }

    {
        let mut sessions = h.manager.sessions.lock();
        let slot = sessions.get_mut(&session.id).expect("session in cache");
        slot.workspace_path = Some(workspace_dir.path().to_path_buf());
        slot.set_phase(Phase::PlanReview);
        slot.set_review_round(1);
    }

    h.manager.poll().await;

    let reconciled = h.manager.get(&session.id).expect("session");
    assert_eq!(reconciled.phase, Phase::Implementing);

    let events = h.subscriber.events();
    assert!(events.iter().any(|e| e.event_type == EventType::ReviewCompleted));
    assert!(events.iter().any(|e| e.event_type == EventType::PhaseTransitioned));
}

fn closed_issue(id: &str) -> Issue {
    Issue {
        id: id.to_string(),
        title: "done".to_string(),
        description: String::new(),
        state: IssueState::Closed,
        labels: Vec::new(),
        assignee: None,
        priority: None,
    }
}

#[tokio::test]
async fn cleanup_tears_down_merged_sessions_runtime_and_workspace() {
    let h = harness();
    let session = h
        .manager
        .spawn(SpawnRequest {
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");

    {
        let mut sessions = h.manager.sessions.lock();
        let slot = sessions.get_mut(&session.id).expect("session in cache");
        slot.set_status(SessionStatus::Merged);
    }

    let cleaned = h.manager.cleanup(None).await.expect("cleanup");
    assert_eq!(cleaned, vec![session.id.clone()]);

    let reconciled = h.manager.get(&session.id).expect("session");
    assert_eq!(reconciled.status, SessionStatus::Cleanup);
    assert!(reconciled.workspace_path.is_none());
    assert!(reconciled.runtime_handle.is_none());

    let handle_id = session.runtime_handle.as_ref().unwrap().id.clone();
    assert!(h
        .runtime
        .calls()
        .iter()
        .any(|c| matches!(c, ao_adapters::runtime::RuntimeCall::Destroy { id } if *id == handle_id)));
    assert!(h
        .workspace
        .calls()
        .iter()
        .any(|c| matches!(c, ao_adapters::workspace::WorkspaceCall::Destroy { .. })));
}

#[tokio::test]
async fn cleanup_leaves_sessions_with_a_still_open_issue_alone() {
    let h = harness();
    h.manager.register_project(
        h.project_id.clone(),
        ProjectPluginConfig {
            repo_path: h.manager.project_config_snapshot(&h.project_id).unwrap().repo_path,
            runtime: "tmux".to_string(),
            agent: "claude".to_string(),
            workspace: "git-worktree".to_string(),
            tracker: Some("linear".to_string()),
            scm: Some("github".to_string()),
            simple_mode: true,
            auto_review_enabled: false,
        },
    );
    h.tracker.seed(Issue {
        id: "iss-1".to_string(),
        title: "still open".to_string(),
        description: String::new(),
        state: IssueState::Open,
        labels: Vec::new(),
        assignee: None,
        priority: None,
    });
    let session = h
        .manager
        .spawn(SpawnRequest {
            issue_id: Some("iss-1".to_string()),
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    {
        let mut sessions = h.manager.sessions.lock();
        let slot = sessions.get_mut(&session.id).expect("session in cache");
        slot.set_status(SessionStatus::NeedsInput);
    }

    let cleaned = h.manager.cleanup(None).await.expect("cleanup");
    assert!(cleaned.is_empty());
    assert_eq!(h.manager.get(&session.id).unwrap().status, SessionStatus::NeedsInput);
}

#[tokio::test]
async fn cleanup_tears_down_sessions_whose_tracked_issue_closed() {
    let h = harness();
    let repo_path = h.manager.project_config_snapshot(&h.project_id).unwrap().repo_path;
    h.manager.register_project(
        h.project_id.clone(),
        ProjectPluginConfig {
            repo_path,
            runtime: "tmux".to_string(),
            agent: "claude".to_string(),
            workspace: "git-worktree".to_string(),
            tracker: Some("linear".to_string()),
            scm: Some("github".to_string()),
            simple_mode: true,
            auto_review_enabled: false,
        },
    );
    h.tracker.seed(closed_issue("iss-2"));
    let session = h
        .manager
        .spawn(SpawnRequest {
            issue_id: Some("iss-2".to_string()),
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    {
        let mut sessions = h.manager.sessions.lock();
        let slot = sessions.get_mut(&session.id).expect("session in cache");
        slot.set_status(SessionStatus::NeedsInput);
    }

    let cleaned = h.manager.cleanup(None).await.expect("cleanup");
    assert_eq!(cleaned, vec![session.id.clone()]);

    let reconciled = h.manager.get(&session.id).expect("session");
    assert_eq!(reconciled.status, SessionStatus::Cleanup);

    let handle_id = session.runtime_handle.as_ref().unwrap().id.clone();
    assert!(h
        .runtime
        .calls()
        .iter()
        .any(|c| matches!(c, ao_adapters::runtime::RuntimeCall::Destroy { id } if *id == handle_id)));
    assert_eq!(h.manager.worker_pool.get_status().global_active, 0);
}

#[tokio::test]
async fn cleanup_skips_sessions_still_spawning_or_working_even_if_their_issue_closed() {
    let h = harness();
    let repo_path = h.manager.project_config_snapshot(&h.project_id).unwrap().repo_path;
    h.manager.register_project(
        h.project_id.clone(),
        ProjectPluginConfig {
            repo_path,
            runtime: "tmux".to_string(),
            agent: "claude".to_string(),
            workspace: "git-worktree".to_string(),
            tracker: Some("linear".to_string()),
            scm: Some("github".to_string()),
            simple_mode: true,
            auto_review_enabled: false,
        },
    );
    h.tracker.seed(closed_issue("iss-3"));
    let session = h
        .manager
        .spawn(SpawnRequest {
            issue_id: Some("iss-3".to_string()),
            prompt: Some("go".to_string()),
            ..SpawnRequest::new(h.project_id.clone())
        })
        .await
        .expect("spawn");
    // freshly spawned sessions start out `Spawning`, the exact status this
    // test is guarding against cleanup yanking a runtime out from under.

    let cleaned = h.manager.cleanup(None).await.expect("cleanup");
    assert!(cleaned.is_empty());
    assert_eq!(h.manager.get(&session.id).unwrap().status, SessionStatus::Spawning);
}
