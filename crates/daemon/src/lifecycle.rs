// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: config load, singleton lock, Session Manager wiring,
//! and rehydrate-from-disk recovery.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use ao_adapters::{
    DesktopNotifyAdapter, GitWorktreeAdapter, NoOpAgentAdapter, NoOpNotifyAdapter,
    NoOpRuntimeAdapter, NoOpScmAdapter, NoOpTerminalAdapter, NoOpTrackerAdapter,
    NoOpWorkspaceAdapter, PluginRegistry, TmuxRuntimeAdapter,
};
use ao_core::{Clock, SequentialIdGen, SystemClock};
use ao_engine::{CycleDetector, EventBus, RateLimitTracker, ReactionEngine, SessionManager, WorkerPool};
use ao_storage::MetadataStore;
use fs2::FileExt;
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::info;

use crate::env;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("could not determine a state directory (set AO_STATE_DIR or HOME)")]
    NoStateDir,

    #[error("another aod instance is already running (lock held on {0:?})")]
    LockFailed(PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SessionManager(#[from] ao_engine::SessionManagerError),
}

/// Daemon configuration. Paths are fixed relative to the state directory —
/// there is no config file to parse (out of scope); everything here comes
/// from environment variables or built-in defaults.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub socket_path: PathBuf,
    pub lock_path: PathBuf,
    pub log_path: PathBuf,
    pub sessions_dir: PathBuf,
    pub poll_interval: std::time::Duration,
    pub global_max: u32,
    pub project_max_default: u32,
}

impl Config {
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        Ok(Self {
            socket_path: state_dir.join("daemon.sock"),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            sessions_dir: state_dir.join("sessions"),
            poll_interval: env::poll_interval(),
            global_max: env::global_max(),
            project_max_default: env::project_max_default(),
            state_dir,
        })
    }
}

/// Running daemon state, shared between the listener task and the
/// reconciliation loop task.
pub struct Daemon {
    pub config: Config,
    #[allow(dead_code)]
    lock_file: File,
    pub manager: Arc<SessionManager>,
    pub start_time: Instant,
}

/// Acquires the singleton lock, wires a `SessionManager` with the concrete
/// plugins this corpus ships (tmux runtime, git-worktree workspace, desktop
/// notifier) plus a `"noop"` fallback per slot for dry-run/offline use and
/// the slots with no concrete implementation (agent/scm/tracker/terminal —
/// individual plugin bodies for those are left to plugin authors), subscribes
/// a `ReactionEngine` to the event bus, rehydrates sessions from disk, and
/// binds the Unix socket.
pub async fn startup(config: &Config) -> Result<(Daemon, UnixListener), LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;
    std::fs::create_dir_all(&config.sessions_dir)?;

    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|_| LifecycleError::LockFailed(config.lock_path.clone()))?;

    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)?;

    let worktree_root = config.state_dir.join("worktrees");
    std::fs::create_dir_all(&worktree_root)?;

    let mut registry = PluginRegistry::new();
    registry.register_runtime("tmux", "tmux-backed runtime", Arc::new(TmuxRuntimeAdapter::new()));
    registry.register_runtime("noop", "no-op runtime (dry-run/offline)", Arc::new(NoOpRuntimeAdapter));
    registry.register_workspace(
        "git-worktree",
        "git worktree workspace",
        Arc::new(GitWorktreeAdapter::new(worktree_root)),
    );
    registry.register_workspace("noop", "no-op workspace (dry-run/offline)", Arc::new(NoOpWorkspaceAdapter));
    registry.register_notifier("desktop", "desktop notifications", Arc::new(DesktopNotifyAdapter::new()));
    registry.register_notifier("noop", "no-op notifier (graceful degradation)", Arc::new(NoOpNotifyAdapter));
    registry.register_agent("noop", "no-op agent (no plugin configured)", Arc::new(NoOpAgentAdapter));
    registry.register_scm("noop", "no-op scm (no plugin configured)", Arc::new(NoOpScmAdapter));
    registry.register_tracker("noop", "no-op tracker (no plugin configured)", Arc::new(NoOpTrackerAdapter));
    registry.register_terminal("noop", "no-op terminal (no plugin configured)", Arc::new(NoOpTerminalAdapter));
    let registry = Arc::new(registry);

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let metadata = Arc::new(MetadataStore::new(config.sessions_dir.clone()));
    let worker_pool = Arc::new(WorkerPool::new(config.global_max, config.project_max_default));
    let rate_limit = Arc::new(RateLimitTracker::new(clock.clone()));
    let cycle_detector = Arc::new(CycleDetector::new());
    let event_bus = Arc::new(EventBus::new());
    let id_gen = Arc::new(SequentialIdGen::new());

    let manager = Arc::new(SessionManager::new(
        clock.clone(),
        registry.clone(),
        metadata,
        worker_pool,
        rate_limit,
        cycle_detector,
        event_bus.clone(),
        id_gen.clone(),
    ));
    manager.rehydrate()?;
    let recovered = manager.list_all(None);
    info!(sessions = recovered.len(), "rehydrated sessions from disk");

    // Session ids are `<projectPrefix>-<monotonic>` with the project id as
    // the prefix; resume each project's counter past the highest monotonic
    // suffix recovered so a restart never reissues an id already on disk.
    for session in &recovered {
        let prefix = format!("{}-", session.project_id.as_str());
        if let Some(suffix) = session.id.as_str().strip_prefix(&prefix) {
            if let Ok(n) = suffix.parse::<u64>() {
                id_gen.resume_after(session.project_id.as_str(), n);
            }
        }
    }

    let reaction_engine = Arc::new(ReactionEngine::new(manager.clone(), registry, event_bus.clone(), clock));
    event_bus.subscribe(reaction_engine);

    let daemon = Daemon {
        config: config.clone(),
        lock_file,
        manager,
        start_time: Instant::now(),
    };
    Ok((daemon, listener))
}

pub fn shutdown(config: &Config) {
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
