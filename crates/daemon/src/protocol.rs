// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol between `ao` (CLI) and `aod` (daemon). Intentionally thin:
//! the daemon's only job here is to expose the Session Manager's eight
//! operations over a Unix socket so the CLI has something to call.

use crate::protocol_types::{DaemonStatusPayload, ProjectSummary, SessionDetail, SessionSummary};
use serde::{Deserialize, Serialize};

/// Request from CLI to daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check.
    Ping,

    /// Version handshake.
    Hello { version: String },

    /// Daemon-wide status snapshot.
    Status,

    /// Register (or re-register) a project's plugin wiring. The CLI sends
    /// this before the first `SpawnSession` for a project it hasn't seen;
    /// config-file parsing itself is out of scope, so this is how the
    /// daemon learns about a project at all.
    RegisterProject {
        project_id: String,
        repo_path: std::path::PathBuf,
        runtime: String,
        agent: String,
        workspace: String,
        #[serde(default)]
        tracker: Option<String>,
        #[serde(default)]
        scm: Option<String>,
        #[serde(default)]
        simple_mode: bool,
        #[serde(default)]
        auto_review_enabled: bool,
    },

    /// Spawn a new session.
    SpawnSession {
        project_id: String,
        #[serde(default)]
        issue_id: Option<String>,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        phase: Option<String>,
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        extra_args: Vec<String>,
    },

    /// Send a message to a running session's agent.
    SessionSend { id: String, message: String },

    /// Kill a session (idempotent).
    SessionKill {
        id: String,
        #[serde(default)]
        reason: Option<String>,
    },

    /// Tear down terminal sessions (and their workspaces/runtimes).
    SessionCleanup {
        #[serde(default)]
        project_id: Option<String>,
    },

    /// Rehydrate a single session from its on-disk record.
    SessionRestore { id: String },

    /// Read state.
    Query { query: Query },

    /// Request daemon shutdown.
    Shutdown,
}

/// Query types for reading daemon state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Query {
    /// Non-terminal sessions, optionally filtered by project.
    ListSessions {
        #[serde(default)]
        project_id: Option<String>,
    },
    /// Every session including terminal ones, optionally filtered by project.
    ListAllSessions {
        #[serde(default)]
        project_id: Option<String>,
    },
    GetSession { id: String },
    ListProjects,
}

/// Response from daemon to CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,
    Pong,
    Hello { version: String },
    ShuttingDown,
    Status(DaemonStatusPayload),
    Session(SessionDetail),
    Sessions(Vec<SessionSummary>),
    Projects(Vec<ProjectSummary>),
    SessionIds(Vec<String>),
    Error { kind: String, message: String },
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
