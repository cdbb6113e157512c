// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Session Manager: the nucleus that turns plugin calls into `Session`
//! state. Owns the in-memory session cache (metadata on disk is the
//! durable copy; this cache is what `list`/`listAll`/`poll` read and write),
//! and drives the eight operations every caller (CLI, daemon IPC, the
//! reconciliation loop) goes through: `spawn`, `send`, `kill`, `list`,
//! `list_all`, `cleanup`, `restore`, `poll`. `poll` additionally drives
//! `spawn_reviewer`, a `spawn` variant that reuses the parent's workspace
//! instead of cutting a new one, whenever the Phase Manager asks for a
//! reviewer sub-session.

pub mod codec;
pub mod error;
pub mod status;

pub use error::SessionManagerError;
pub use status::derive_status;

use crate::cycle_detector::{CycleDetector, Recommendation};
use crate::event_bus::EventBus;
use crate::phase_manager::{FsPhaseArtifactReader, PhaseManager, SubSessionQuery};
use crate::rate_limit::RateLimitTracker;
use crate::worker_pool::WorkerPool;
use ao_adapters::workspace::WorkspaceCreateConfig;
use ao_adapters::{AgentLaunchConfig, PluginRegistry, RuntimeHandle as AdapterRuntimeHandle, RuntimeLaunchConfig};
use ao_core::{
    Activity, Clock, EventType, IdGen, OrchestratorEvent, Phase, ReviewerRole, Session, SessionId,
    SessionStatus, SubSessionInfo,
};
use ao_storage::MetadataStore;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ao_core::ProjectId;

/// Per-project wiring: which registered plugin (by name) services each slot
/// for sessions of this project, plus the repo path new workspaces are cut
/// from. Plugin *names* are kept here rather than `Arc<dyn Trait>` handles
/// so the association survives a restart via the registry's own lookup.
#[derive(Debug, Clone)]
pub struct ProjectPluginConfig {
    pub repo_path: PathBuf,
    pub runtime: String,
    pub agent: String,
    pub workspace: String,
    pub tracker: Option<String>,
    pub scm: Option<String>,
    pub simple_mode: bool,
    pub auto_review_enabled: bool,
}

/// Parameters for `SessionManager::spawn`.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub project_id: ProjectId,
    pub issue_id: Option<String>,
    pub prompt: Option<String>,
    pub phase: Option<Phase>,
    pub model: Option<String>,
    pub extra_args: Vec<String>,
}

impl SpawnRequest {
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            issue_id: None,
            prompt: None,
            phase: None,
            model: None,
            extra_args: Vec::new(),
        }
    }
}

/// Looks up whether a reviewer sub-session is already live by scanning the
/// in-memory session cache for a matching `sub_session_info`.
struct CacheSubSessionQuery<'a> {
    sessions: &'a [Session],
}

impl SubSessionQuery for CacheSubSessionQuery<'_> {
    fn has_live_reviewer(
        &self,
        parent: &SessionId,
        phase: Phase,
        round: u32,
        role: ao_core::ReviewerRole,
    ) -> bool {
        self.sessions.iter().any(|s| {
            !s.is_terminal()
                && s.sub_session_info.as_ref().is_some_and(|info| {
                    info.parent_session_id == *parent
                        && info.phase == phase
                        && info.round == round
                        && info.role == role
                })
        })
    }
}

/// Reviewer spawns that fail this many times in a row for the same
/// `(session, phase, round, role)` stop being silently retried and surface
/// an `escalation.required` instead.
const MAX_REVIEWER_SPAWN_FAILURES: u32 = 3;

/// Instructions handed to a reviewer sub-session. Points it at the same
/// plan/diff the parent session produced and tells it where to record its
/// verdict, matching the artifact path `PhaseArtifactReader` later reads.
fn reviewer_prompt(role: ReviewerRole, phase: Phase, round: u32) -> String {
    format!(
        "You are reviewing this workspace as the {role} reviewer for the {phase} phase, round {round}. \
         Read the plan and/or code changes already present in this workspace. \
         When finished, write your verdict to `.ao/reviews/{phase}-{round}-{role}.md` with a line \
         `decision: approved` or `decision: changes_requested`, plus any feedback."
    )
}

fn event_type_for_status(status: SessionStatus) -> Option<EventType> {
    match status {
        SessionStatus::PrOpen => Some(EventType::PrOpened),
        SessionStatus::CiFailed => Some(EventType::PrCiFailed),
        SessionStatus::ChangesRequested => Some(EventType::PrChangesRequested),
        SessionStatus::Mergeable => Some(EventType::PrMergeable),
        SessionStatus::Merged => Some(EventType::PrMerged),
        SessionStatus::Stuck => Some(EventType::EscalationRequired),
        _ => None,
    }
}

fn to_adapter_handle(handle: &ao_core::RuntimeHandle) -> AdapterRuntimeHandle {
    AdapterRuntimeHandle {
        id: handle.id.clone(),
        runtime_name: handle.runtime_name.clone(),
    }
}

pub struct SessionManager {
    clock: Arc<dyn Clock>,
    registry: Arc<PluginRegistry>,
    metadata: Arc<MetadataStore>,
    worker_pool: Arc<WorkerPool>,
    rate_limit: Arc<RateLimitTracker>,
    cycle_detector: Arc<CycleDetector>,
    phase_manager: PhaseManager,
    phase_reader: FsPhaseArtifactReader,
    event_bus: Arc<EventBus>,
    id_gen: Arc<dyn IdGen>,
    sessions: Mutex<HashMap<SessionId, Session>>,
    projects: Mutex<HashMap<ProjectId, ProjectPluginConfig>>,
    reviewer_spawn_failures: Mutex<HashMap<(SessionId, Phase, u32, ReviewerRole), u32>>,
}

#[allow(clippy::too_many_arguments)]
impl SessionManager {
    pub fn new(
        clock: Arc<dyn Clock>,
        registry: Arc<PluginRegistry>,
        metadata: Arc<MetadataStore>,
        worker_pool: Arc<WorkerPool>,
        rate_limit: Arc<RateLimitTracker>,
        cycle_detector: Arc<CycleDetector>,
        event_bus: Arc<EventBus>,
        id_gen: Arc<dyn IdGen>,
    ) -> Self {
        Self {
            clock,
            registry,
            metadata,
            worker_pool,
            rate_limit,
            cycle_detector,
            phase_manager: PhaseManager::new(),
            phase_reader: FsPhaseArtifactReader,
            event_bus,
            id_gen,
            sessions: Mutex::new(HashMap::new()),
            projects: Mutex::new(HashMap::new()),
            reviewer_spawn_failures: Mutex::new(HashMap::new()),
        }
    }

    pub fn register_project(&self, project_id: ProjectId, config: ProjectPluginConfig) {
        self.projects.lock().insert(project_id, config);
    }

    /// IDs of every project registered so far, for callers (e.g. the daemon's
    /// `ListProjects` query) that need to enumerate wiring without reaching
    /// into the private `projects` map.
    pub fn project_ids(&self) -> Vec<ProjectId> {
        self.projects.lock().keys().cloned().collect()
    }

    /// A copy of a project's plugin wiring, if registered.
    pub fn project_config_snapshot(&self, project_id: &ProjectId) -> Option<ProjectPluginConfig> {
        self.projects.lock().get(project_id).cloned()
    }

    /// Current Worker Pool occupancy, for status reporting.
    pub fn worker_pool_status(&self) -> crate::worker_pool::WorkerPoolStatus {
        self.worker_pool.get_status()
    }

    /// Rehydrates the in-memory cache from the Metadata Store. Sessions with
    /// an unparsable record are skipped and logged rather than failing the
    /// whole restart.
    pub fn rehydrate(&self) -> Result<(), SessionManagerError> {
        let mut sessions = self.sessions.lock();
        for id in self.metadata.list()? {
            let session_id = SessionId::new(id.clone());
            let Some(record) = self.metadata.read_raw(&id)? else {
                continue;
            };
            match codec::session_from_record(&session_id, record) {
                Ok(session) => {
                    sessions.insert(session_id, session);
                }
                Err(err) => {
                    tracing::error!(session_id = %id, error = %err, "skipping corrupt session record");
                }
            }
        }
        self.worker_pool
            .sync_from_sessions(&sessions.values().cloned().collect::<Vec<_>>());
        Ok(())
    }

    fn project_config(&self, project_id: &ProjectId) -> Result<ProjectPluginConfig, SessionManagerError> {
        self.projects
            .lock()
            .get(project_id)
            .cloned()
            .ok_or_else(|| SessionManagerError::PluginMissing {
                slot: "project",
                name: project_id.to_string(),
            })
    }

    /// `record_from_session` always produces a complete record (it starts
    /// from the session's own metadata map, not a partial), so this writes
    /// the full record rather than merging — a stale key cleared by the
    /// codec (e.g. a runtime handle that went away) must actually disappear.
    fn persist(&self, session: &Session) -> Result<(), SessionManagerError> {
        self.metadata
            .write(session.id.as_str(), &codec::record_from_session(session))?;
        Ok(())
    }

    fn publish(&self, event: OrchestratorEvent) {
        self.event_bus.publish(event);
    }

    fn emit(&self, session: &Session, event_type: EventType, message: impl Into<String>) {
        let id = format!("{}-{}", session.id.as_str(), self.clock.epoch_ms());
        self.publish(
            OrchestratorEvent::new(id, event_type, session.project_id.clone(), self.clock.epoch_ms(), message)
                .with_session(session.id.clone()),
        );
    }

    pub fn get(&self, session_id: &SessionId) -> Option<Session> {
        self.sessions.lock().get(session_id).cloned()
    }

    /// Non-terminal sessions, optionally filtered by project.
    pub fn list(&self, project_id: Option<&ProjectId>) -> Vec<Session> {
        self.sessions
            .lock()
            .values()
            .filter(|s| !s.is_terminal())
            .filter(|s| project_id.is_none_or(|p| s.project_id == *p))
            .cloned()
            .collect()
    }

    /// Every session, including terminal ones, optionally filtered by project.
    pub fn list_all(&self, project_id: Option<&ProjectId>) -> Vec<Session> {
        self.sessions
            .lock()
            .values()
            .filter(|s| project_id.is_none_or(|p| s.project_id == *p))
            .cloned()
            .collect()
    }

    pub async fn spawn(&self, req: SpawnRequest) -> Result<Session, SessionManagerError> {
        let config = self.project_config(&req.project_id)?;

        let session_id = SessionId::new(self.id_gen.next(req.project_id.as_str()));

        let admission = self.worker_pool.try_reserve(&req.project_id, &session_id);
        if !admission.can_spawn {
            return Err(SessionManagerError::SpawnDenied {
                reason: admission
                    .reason
                    .unwrap_or_else(|| "admission denied".to_string()),
            });
        }

        macro_rules! release_on_err {
            ($expr:expr) => {
                match $expr {
                    Ok(value) => value,
                    Err(err) => {
                        self.worker_pool.record_exit(&req.project_id, &session_id);
                        return Err(err.into());
                    }
                }
            };
        }

        let agent = release_on_err!(self.registry.agent(&config.agent).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "agent",
                name: config.agent.clone(),
            }
        }));
        let runtime = release_on_err!(self.registry.runtime(&config.runtime).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "runtime",
                name: config.runtime.clone(),
            }
        }));
        let workspace = release_on_err!(self.registry.workspace(&config.workspace).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "workspace",
                name: config.workspace.clone(),
            }
        }));
        let tracker = config.tracker.as_ref().and_then(|name| self.registry.tracker(name));

        let executable = self.rate_limit.get_available_executable(agent.process_name());
        if self.rate_limit.is_rate_limited(&executable) {
            let reset_at = self
                .rate_limit
                .get_entry(&executable)
                .map(|e| e.reset_at.to_rfc3339())
                .unwrap_or_default();
            self.worker_pool.record_exit(&req.project_id, &session_id);
            return Err(SessionManagerError::RateLimited { reset_at });
        }
        let agent = if executable == agent.process_name() {
            agent
        } else {
            self.registry.agent(&executable).unwrap_or(agent)
        };

        let (branch, prompt) = match (&req.issue_id, &tracker) {
            (Some(issue_id), Some(tracker)) => {
                let branch = tracker.branch_name(issue_id, &req.project_id);
                let prompt = match &req.prompt {
                    Some(p) => p.clone(),
                    None => release_on_err!(tracker.generate_prompt(issue_id, &req.project_id).await),
                };
                (branch, prompt)
            }
            _ => (
                format!("ao/{}", session_id.as_str()),
                req.prompt.clone().unwrap_or_default(),
            ),
        };

        let workspace_info = release_on_err!(
            workspace
                .create(&WorkspaceCreateConfig {
                    project_id: req.project_id.clone(),
                    repo_path: config.repo_path.clone(),
                    branch: branch.clone(),
                })
                .await
        );
        let _ = workspace.post_create(&workspace_info, &req.project_id).await;

        let now_ms = self.clock.epoch_ms();
        let mut session = Session {
            id: session_id.clone(),
            project_id: req.project_id.clone(),
            branch: Some(branch),
            issue_id: req.issue_id.clone(),
            workspace_path: Some(workspace_info.path.clone()),
            status: SessionStatus::Spawning,
            activity: Activity::Starting,
            phase: req.phase.unwrap_or(Phase::Planning),
            runtime_handle: None,
            agent_info: None,
            sub_session_info: None,
            metadata: HashMap::new(),
            created_at_ms: now_ms,
            last_activity_at_ms: now_ms,
        };
        release_on_err!(self.persist(&session));

        let launch_cfg = AgentLaunchConfig {
            prompt,
            model: req.model.clone(),
            extra_args: req.extra_args.clone(),
        };
        let _ = agent.setup_workspace_hooks(&workspace_info.path, &launch_cfg).await;

        let runtime_cfg = RuntimeLaunchConfig {
            name: session_id.as_str().to_string(),
            cwd: workspace_info.path.clone(),
            command: agent.get_launch_command(&launch_cfg),
            env: agent.get_environment(&launch_cfg),
        };
        let handle = release_on_err!(runtime.create(&runtime_cfg).await);
        session.runtime_handle = Some(handle.into());

        let _ = agent.post_launch_setup(&session).await;

        self.persist(&session)?;
        self.emit(&session, EventType::SessionSpawned, "session spawned");
        self.sessions.lock().insert(session_id, session.clone());
        Ok(session)
    }

    /// Spawns a reviewer sub-session for `parent`. Unlike `spawn`, no new
    /// workspace is created: the reviewer is launched directly into the
    /// parent's existing workspace path, since it only needs to read the
    /// plan/diff already there and write its verdict alongside it.
    pub async fn spawn_reviewer(
        &self,
        parent: &Session,
        phase: Phase,
        round: u32,
        role: ReviewerRole,
    ) -> Result<Session, SessionManagerError> {
        let config = self.project_config(&parent.project_id)?;
        let workspace_path = parent
            .workspace_path
            .clone()
            .ok_or_else(|| SessionManagerError::NoWorkspace(parent.id.to_string()))?;

        let session_id = SessionId::new(self.id_gen.next(parent.project_id.as_str()));

        let admission = self.worker_pool.try_reserve(&parent.project_id, &session_id);
        if !admission.can_spawn {
            return Err(SessionManagerError::SpawnDenied {
                reason: admission.reason.unwrap_or_else(|| "admission denied".to_string()),
            });
        }

        macro_rules! release_on_err {
            ($expr:expr) => {
                match $expr {
                    Ok(value) => value,
                    Err(err) => {
                        self.worker_pool.record_exit(&parent.project_id, &session_id);
                        return Err(err.into());
                    }
                }
            };
        }

        let agent = release_on_err!(self.registry.agent(&config.agent).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "agent",
                name: config.agent.clone(),
            }
        }));
        let runtime = release_on_err!(self.registry.runtime(&config.runtime).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "runtime",
                name: config.runtime.clone(),
            }
        }));

        let now_ms = self.clock.epoch_ms();
        let mut session = Session {
            id: session_id.clone(),
            project_id: parent.project_id.clone(),
            branch: parent.branch.clone(),
            issue_id: parent.issue_id.clone(),
            workspace_path: Some(workspace_path.clone()),
            status: SessionStatus::Spawning,
            activity: Activity::Starting,
            phase,
            runtime_handle: None,
            agent_info: None,
            sub_session_info: Some(SubSessionInfo {
                parent_session_id: parent.id.clone(),
                role,
                phase,
                round,
            }),
            metadata: HashMap::new(),
            created_at_ms: now_ms,
            last_activity_at_ms: now_ms,
        };
        release_on_err!(self.persist(&session));

        let launch_cfg = AgentLaunchConfig {
            prompt: reviewer_prompt(role, phase, round),
            model: None,
            extra_args: Vec::new(),
        };
        let _ = agent.setup_workspace_hooks(&workspace_path, &launch_cfg).await;

        let runtime_cfg = RuntimeLaunchConfig {
            name: session_id.as_str().to_string(),
            cwd: workspace_path,
            command: agent.get_launch_command(&launch_cfg),
            env: agent.get_environment(&launch_cfg),
        };
        let handle = release_on_err!(runtime.create(&runtime_cfg).await);
        session.runtime_handle = Some(handle.into());

        let _ = agent.post_launch_setup(&session).await;

        self.persist(&session)?;
        self.emit(&session, EventType::SessionSpawned, format!("{role} reviewer spawned"));
        self.sessions.lock().insert(session_id, session.clone());
        Ok(session)
    }

    pub async fn send(&self, session_id: &SessionId, message: &str) -> Result<(), SessionManagerError> {
        let session = self
            .sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionManagerError::SessionNotFound(session_id.to_string()))?;
        let config = self.project_config(&session.project_id)?;
        let runtime = self
            .registry
            .runtime(&config.runtime)
            .ok_or_else(|| SessionManagerError::PluginMissing {
                slot: "runtime",
                name: config.runtime,
            })?;
        let handle = session
            .runtime_handle
            .as_ref()
            .ok_or_else(|| SessionManagerError::RuntimeDead(session_id.to_string()))?;
        runtime.send_message(&to_adapter_handle(handle), message).await?;

        let mut sessions = self.sessions.lock();
        if let Some(session) = sessions.get_mut(session_id) {
            session.last_activity_at_ms = self.clock.epoch_ms();
            self.persist(session)?;
            self.emit(session, EventType::SessionMessageSent, "message sent");
        }
        Ok(())
    }

    /// Destroys the runtime behind `session`, if one is registered and a
    /// handle is live. Errors are logged and swallowed: a runtime that's
    /// already gone isn't a failure for the caller tearing it down.
    async fn destroy_runtime(&self, session: &Session) {
        if let Ok(config) = self.project_config(&session.project_id) {
            if let (Some(runtime), Some(handle)) = (
                self.registry.runtime(&config.runtime),
                session.runtime_handle.as_ref(),
            ) {
                if let Err(err) = runtime.destroy(&to_adapter_handle(handle)).await {
                    tracing::warn!(session_id = %session.id, error = %err, "runtime destroy failed");
                }
            }
        }
    }

    pub async fn kill(&self, session_id: &SessionId, reason: Option<&str>) -> Result<Session, SessionManagerError> {
        let session = self
            .sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionManagerError::SessionNotFound(session_id.to_string()))?;
        if session.is_terminal() {
            return Ok(session);
        }

        self.destroy_runtime(&session).await;

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionManagerError::SessionNotFound(session_id.to_string()))?;
        session.set_status(SessionStatus::Killed);
        session.activity = Activity::Exited;
        session.runtime_handle = None;
        self.worker_pool.record_exit(&session.project_id, session_id);
        self.cycle_detector.clear_session(session_id);
        self.persist(session)?;
        self.emit(
            session,
            EventType::SessionKilled,
            reason.unwrap_or("killed").to_string(),
        );
        Ok(session.clone())
    }

    /// For each session whose PR merged, or whose tracked issue is closed
    /// while the session sits in a safe (non-`spawning`/`working`) status,
    /// calls `kill` on the runtime and `destroy` on the workspace, then
    /// moves it to `cleanup`. A session still actively spawning or working
    /// is left alone even if its issue just closed, so an in-flight agent
    /// is never yanked out from under itself.
    pub async fn cleanup(&self, project_id: Option<&ProjectId>) -> Result<Vec<SessionId>, SessionManagerError> {
        let snapshot: Vec<Session> = self
            .sessions
            .lock()
            .values()
            .filter(|s| project_id.is_none_or(|p| s.project_id == *p))
            .filter(|s| s.status != SessionStatus::Cleanup)
            .cloned()
            .collect();

        let mut candidates = Vec::new();
        for session in snapshot {
            if session.status == SessionStatus::Merged {
                candidates.push(session);
                continue;
            }
            if session.is_terminal() || matches!(session.status, SessionStatus::Spawning | SessionStatus::Working) {
                continue;
            }
            let Some(issue_id) = session.issue_id.clone() else {
                continue;
            };
            let Ok(config) = self.project_config(&session.project_id) else {
                continue;
            };
            let Some(tracker) = config.tracker.as_ref().and_then(|name| self.registry.tracker(name)) else {
                continue;
            };
            match tracker.is_completed(&issue_id, &session.project_id).await {
                Ok(true) => candidates.push(session),
                Ok(false) => {}
                Err(err) => {
                    tracing::warn!(session_id = %session.id, error = %err, "tracker completion check failed during cleanup");
                }
            }
        }

        let mut cleaned = Vec::new();
        for session in candidates {
            self.destroy_runtime(&session).await;

            if let Ok(config) = self.project_config(&session.project_id) {
                if let Some(workspace) = self.registry.workspace(&config.workspace) {
                    if let Some(path) = &session.workspace_path {
                        if let Err(err) = workspace.destroy(path).await {
                            tracing::warn!(session_id = %session.id, error = %err, "workspace destroy failed during cleanup");
                            continue;
                        }
                    }
                }
            }

            self.worker_pool.record_exit(&session.project_id, &session.id);
            self.cycle_detector.clear_session(&session.id);

            let mut sessions = self.sessions.lock();
            if let Some(slot) = sessions.get_mut(&session.id) {
                slot.set_status(SessionStatus::Cleanup);
                slot.activity = Activity::Exited;
                slot.runtime_handle = None;
                slot.workspace_path = None;
                self.persist(slot)?;
                self.emit(slot, EventType::SessionKilled, "cleanup: session resolved");
                cleaned.push(slot.id.clone());
            }
        }
        Ok(cleaned)
    }

    /// Re-creates a runtime around an existing workspace for a session whose
    /// process exited but left its workspace behind.
    pub async fn restore(&self, session_id: &SessionId) -> Result<Session, SessionManagerError> {
        let session = self
            .sessions
            .lock()
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionManagerError::SessionNotFound(session_id.to_string()))?;
        let workspace_path = session
            .workspace_path
            .clone()
            .ok_or_else(|| SessionManagerError::MetadataCorrupt(
                session_id.to_string(),
                "no workspace_path to restore into".to_string(),
            ))?;

        let admission = self.worker_pool.try_reserve(&session.project_id, session_id);
        if !admission.can_spawn {
            return Err(SessionManagerError::SpawnDenied {
                reason: admission.reason.unwrap_or_else(|| "admission denied".to_string()),
            });
        }

        macro_rules! release_on_err {
            ($expr:expr) => {
                match $expr {
                    Ok(value) => value,
                    Err(err) => {
                        self.worker_pool.record_exit(&session.project_id, session_id);
                        return Err(err.into());
                    }
                }
            };
        }

        let config = release_on_err!(self.project_config(&session.project_id));
        let agent = release_on_err!(self.registry.agent(&config.agent).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "agent",
                name: config.agent.clone(),
            }
        }));
        let runtime = release_on_err!(self.registry.runtime(&config.runtime).ok_or_else(|| {
            SessionManagerError::PluginMissing {
                slot: "runtime",
                name: config.runtime,
            }
        }));

        let launch_cfg = AgentLaunchConfig::default();
        let command = agent
            .get_restore_command(&session)
            .unwrap_or_else(|| agent.get_launch_command(&launch_cfg));
        let runtime_cfg = RuntimeLaunchConfig {
            name: session_id.as_str().to_string(),
            cwd: workspace_path,
            command,
            env: agent.get_environment(&launch_cfg),
        };
        let handle = release_on_err!(runtime.create(&runtime_cfg).await);

        let mut sessions = self.sessions.lock();
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| SessionManagerError::SessionNotFound(session_id.to_string()))?;
        session.runtime_handle = Some(handle.into());
        session.activity = Activity::Starting;
        session.set_status(SessionStatus::Working);
        self.persist(session)?;
        self.emit(session, EventType::SessionSpawned, "session restored");
        Ok(session.clone())
    }

    /// One reconciliation tick: walks every non-terminal session, checking
    /// liveness, deriving status, and advancing phase. Enrichment is bounded
    /// to `worker_pool` global capacity * 2 concurrent sessions so a slow
    /// SCM doesn't stall the whole fleet.
    pub async fn poll(self: &Arc<Self>) {
        let ids: Vec<SessionId> = self
            .sessions
            .lock()
            .values()
            .filter(|s| !s.is_terminal())
            .map(|s| s.id.clone())
            .collect();

        let permits = (self.worker_pool.get_status().global_max as usize * 2).max(1);
        let semaphore = Arc::new(tokio::sync::Semaphore::new(permits));
        let mut tasks = tokio::task::JoinSet::new();
        for id in ids {
            let this = self.clone();
            let semaphore = semaphore.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                this.reconcile_one(&id).await;
            });
        }
        while tasks.join_next().await.is_some() {}
    }

    async fn reconcile_one(&self, session_id: &SessionId) {
        let Some(session) = self.get(session_id) else {
            return;
        };
        if session.is_terminal() {
            return;
        }
        let Ok(config) = self.project_config(&session.project_id) else {
            return;
        };
        let Some(agent) = self.registry.agent(&config.agent) else {
            return;
        };
        let runtime = self.registry.runtime(&config.runtime);
        let scm = config.scm.as_ref().and_then(|name| self.registry.scm(name));

        let adapter_handle = session.runtime_handle.as_ref().map(to_adapter_handle);
        let alive = match (&runtime, &adapter_handle) {
            (Some(runtime), Some(handle)) => runtime.is_alive(handle).await.unwrap_or(false),
            _ => false,
        };

        let activity = if !alive {
            if self
                .rate_limit
                .detect_rapid_exit(session.created_at_ms, self.clock.epoch_ms())
                && !self.rate_limit.is_rate_limited(agent.process_name())
            {
                self.rate_limit.record_rate_limit(
                    agent.process_name(),
                    self.clock.now() + chrono::Duration::minutes(15),
                    "unexplained rapid exit",
                );
                self.emit(&session, EventType::SessionRateLimited, "rapid exit treated as rate limit");
            }
            Activity::Exited
        } else {
            if let (Some(runtime), Some(handle)) = (&runtime, &adapter_handle) {
                if let Ok(output) = runtime.get_output(handle, Some(200)).await {
                    let detection = self.rate_limit.detect_from_output(&output);
                    if detection.detected && !self.rate_limit.is_rate_limited(agent.process_name()) {
                        let reset_at = detection
                            .reset_at
                            .unwrap_or_else(|| self.clock.now() + chrono::Duration::minutes(15));
                        self.rate_limit.record_rate_limit(
                            agent.process_name(),
                            reset_at,
                            detection.reason.unwrap_or_default(),
                        );
                        self.emit(&session, EventType::SessionRateLimited, "rate limit detected in output");
                    }
                }
            }
            agent
                .get_activity_state(&session, None)
                .await
                .map(|o| o.state)
                .unwrap_or(session.activity)
        };

        let agent_info = agent.get_session_info(&session).await.ok().flatten();

        let pr = match &scm {
            Some(scm) => tokio::time::timeout(Duration::from_secs(10), scm.detect_pr(&session, &session.project_id))
                .await
                .ok()
                .and_then(|r| r.ok())
                .flatten(),
            None => None,
        };

        self.cycle_detector.record(session_id, session.status);
        let judgment = self.cycle_detector.judge_cycle(session_id);
        if let Some(judgment) = &judgment {
            if judgment.recommendation == Recommendation::Break {
                self.emit(&session, EventType::SessionCycleDetected, judgment.reason.clone());
            }
        }
        let verdict = judgment.map(|j| j.verdict);

        let new_status = status::derive_status(session.status, activity, pr.as_ref(), verdict);
        let status_changed = new_status != session.status;
        let activity_just_exited = session.activity != activity && activity == Activity::Exited;

        let mut session = {
            let mut sessions = self.sessions.lock();
            let Some(slot) = sessions.get_mut(session_id) else {
                return;
            };
            if status_changed {
                slot.set_status(new_status);
            }
            slot.activity = activity;
            if let Some(info) = agent_info {
                slot.agent_info = Some(info);
            }
            slot.clone()
        };

        if activity_just_exited {
            self.emit(&session, EventType::SessionExited, "session exited");
        }
        if status_changed {
            self.worker_pool.record_spawn(&session.project_id, session_id);
            if new_status.is_terminal() {
                self.worker_pool.record_exit(&session.project_id, session_id);
            }
            if let Some(event_type) = event_type_for_status(new_status) {
                self.emit(&session, event_type, format!("status -> {new_status}"));
            }
        }

        // Reviewer sub-sessions don't run their own Phase Manager state
        // machine — they're a leaf task tracked by the parent's phase/round,
        // not a session that itself spawns reviewers.
        if session.sub_session_info.is_none() {
            if let Some(workspace_path) = session.workspace_path.clone() {
                let code_ready = pr.is_some();
                let snapshot: Vec<Session> = self.sessions.lock().values().cloned().collect();
                let query = CacheSubSessionQuery { sessions: &snapshot };
                let result = self
                    .phase_manager
                    .check(
                        &session,
                        &workspace_path,
                        config.simple_mode,
                        code_ready,
                        config.auto_review_enabled,
                        &self.phase_reader,
                        &query,
                    )
                    .await;

                if result.changed {
                    let leaving_review_gate = matches!(session.phase, Phase::PlanReview | Phase::CodeReview);
                    let mut sessions = self.sessions.lock();
                    if let Some(slot) = sessions.get_mut(session_id) {
                        slot.set_phase(result.phase);
                        slot.set_review_round(result.review_round);
                        session = slot.clone();
                    }
                    if leaving_review_gate {
                        self.emit(&session, EventType::ReviewCompleted, format!("review round resolved -> {}", result.phase));
                    }
                    self.emit(&session, EventType::PhaseTransitioned, format!("phase -> {}", result.phase));
                } else {
                    for role in result.roles_to_spawn {
                        let failure_key = (session_id.clone(), result.phase, result.review_round, role);
                        match self.spawn_reviewer(&session, result.phase, result.review_round, role).await {
                            Ok(_) => {
                                self.reviewer_spawn_failures.lock().remove(&failure_key);
                                self.emit(&session, EventType::ReviewRequested, format!("{role} review requested"));
                            }
                            Err(err) => {
                                tracing::warn!(
                                    session_id = %session_id,
                                    role = %role,
                                    error = %err,
                                    "reviewer sub-session spawn failed; will retry next tick"
                                );
                                let mut failures = self.reviewer_spawn_failures.lock();
                                let count = failures.entry(failure_key).or_insert(0);
                                *count += 1;
                                if *count == MAX_REVIEWER_SPAWN_FAILURES {
                                    self.emit(
                                        &session,
                                        EventType::EscalationRequired,
                                        format!("{role} reviewer failed to spawn {count} times in a row"),
                                    );
                                }
                            }
                        }
                    }
                }
            }
        }

        let _ = self.persist(&session);
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
