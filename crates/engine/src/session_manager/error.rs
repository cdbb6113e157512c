// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds the Session Manager's operations can fail with. Each variant
//! maps to one of the fixed error kinds callers (CLI, daemon IPC) switch on.

use ao_adapters::{AgentError, NotifyError, RuntimeError, ScmError, TrackerError, WorkspaceError};
use ao_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionManagerError {
    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("spawn denied: {reason}")]
    SpawnDenied { reason: String },

    #[error("executable rate limited, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("plugin not registered: {slot} plugin {name:?}")]
    PluginMissing { slot: &'static str, name: String },

    #[error("runtime is dead for session {0}")]
    RuntimeDead(String),

    #[error("workspace already exists: {0}")]
    WorkspaceExists(String),

    #[error("session {0} has no workspace for a reviewer sub-session to reuse")]
    NoWorkspace(String),

    #[error("scm request failed transiently: {0}")]
    ScmTransient(String),

    #[error("session {0} metadata is corrupt: {1}")]
    MetadataCorrupt(String, String),

    #[error("session {0} is stuck in an unproductive cycle: {1}")]
    CycleBreak(String, String),

    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Scm(#[from] ScmError),
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
