// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Accepts connections on the daemon's Unix socket and dispatches each
//! request to the Session Manager. One task per connection; requests on a
//! connection are handled sequentially (no pipelining), matching the
//! reference daemon's listener shape without its job/queue/worker surface.

use std::sync::Arc;

use ao_core::{Phase, ProjectId, SessionId};
use ao_engine::{ProjectPluginConfig, SessionManager, SessionManagerError, SpawnRequest};
use tokio::net::{UnixListener, UnixStream};
use tracing::{info, warn};

use crate::protocol::{Query, Request, Response};
use crate::protocol_types::{DaemonStatusPayload, ProjectSummary, SessionDetail, SessionSummary};
use crate::protocol_wire::{self, DEFAULT_TIMEOUT};

pub struct Listener {
    listener: UnixListener,
    manager: Arc<SessionManager>,
    start_time: std::time::Instant,
}

impl Listener {
    pub fn new(listener: UnixListener, manager: Arc<SessionManager>, start_time: std::time::Instant) -> Self {
        Self {
            listener,
            manager,
            start_time,
        }
    }

    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, _addr)) => {
                    let manager = self.manager.clone();
                    let start_time = self.start_time;
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(stream, manager, start_time).await {
                            warn!(error = %err, "connection handler exited with an error");
                        }
                    });
                }
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                }
            }
        }
    }
}

async fn handle_connection(
    mut stream: UnixStream,
    manager: Arc<SessionManager>,
    start_time: std::time::Instant,
) -> Result<(), protocol_wire::ProtocolError> {
    loop {
        let request = match protocol_wire::read_request(&mut stream, DEFAULT_TIMEOUT).await {
            Ok(req) => req,
            Err(protocol_wire::ProtocolError::ConnectionClosed) => return Ok(()),
            Err(err) => return Err(err),
        };

        let shutdown_requested = matches!(request, Request::Shutdown);
        let response = dispatch(&manager, request, start_time).await;
        protocol_wire::write_response(&mut stream, &response, DEFAULT_TIMEOUT).await?;

        if shutdown_requested {
            return Ok(());
        }
    }
}

async fn dispatch(manager: &Arc<SessionManager>, request: Request, start_time: std::time::Instant) -> Response {
    match request {
        Request::Ping => Response::Pong,
        Request::Hello { version } => {
            info!(client_version = %version, "cli connected");
            Response::Hello {
                version: protocol_wire::PROTOCOL_VERSION.to_string(),
            }
        }
        Request::Status => Response::Status(status_payload(manager, start_time)),
        Request::RegisterProject {
            project_id,
            repo_path,
            runtime,
            agent,
            workspace,
            tracker,
            scm,
            simple_mode,
            auto_review_enabled,
        } => {
            manager.register_project(
                ProjectId::new(project_id),
                ProjectPluginConfig {
                    repo_path,
                    runtime,
                    agent,
                    workspace,
                    tracker,
                    scm,
                    simple_mode,
                    auto_review_enabled,
                },
            );
            Response::Ok
        }
        Request::SpawnSession {
            project_id,
            issue_id,
            prompt,
            phase,
            model,
            extra_args,
        } => {
            let mut req = SpawnRequest::new(ProjectId::new(project_id));
            req.issue_id = issue_id;
            req.prompt = prompt;
            req.phase = phase.as_deref().and_then(parse_phase);
            req.model = model;
            req.extra_args = extra_args;
            match manager.spawn(req).await {
                Ok(session) => Response::Session(SessionDetail::from(&session)),
                Err(err) => error_response(&err),
            }
        }
        Request::SessionSend { id, message } => {
            match manager.send(&SessionId::new(id), &message).await {
                Ok(()) => Response::Ok,
                Err(err) => error_response(&err),
            }
        }
        Request::SessionKill { id, reason } => {
            match manager.kill(&SessionId::new(id), reason.as_deref()).await {
                Ok(session) => Response::Session(SessionDetail::from(&session)),
                Err(err) => error_response(&err),
            }
        }
        Request::SessionCleanup { project_id } => {
            let project_id = project_id.map(ProjectId::new);
            match manager.cleanup(project_id.as_ref()).await {
                Ok(ids) => Response::SessionIds(ids.into_iter().map(|id| id.as_str().to_string()).collect()),
                Err(err) => error_response(&err),
            }
        }
        Request::SessionRestore { id } => match manager.restore(&SessionId::new(id)).await {
            Ok(session) => Response::Session(SessionDetail::from(&session)),
            Err(err) => error_response(&err),
        },
        Request::Query { query } => dispatch_query(manager, query),
        Request::Shutdown => Response::ShuttingDown,
    }
}

fn dispatch_query(manager: &Arc<SessionManager>, query: Query) -> Response {
    match query {
        Query::ListSessions { project_id } => {
            let project_id = project_id.map(ProjectId::new);
            let sessions = manager.list(project_id.as_ref());
            Response::Sessions(sessions.iter().map(SessionSummary::from).collect())
        }
        Query::ListAllSessions { project_id } => {
            let project_id = project_id.map(ProjectId::new);
            let sessions = manager.list_all(project_id.as_ref());
            Response::Sessions(sessions.iter().map(SessionSummary::from).collect())
        }
        Query::GetSession { id } => match manager.get(&SessionId::new(id.clone())) {
            Some(session) => Response::Session(SessionDetail::from(&session)),
            None => Response::Error {
                kind: "session_not_found".to_string(),
                message: format!("no session with id {id}"),
            },
        },
        Query::ListProjects => Response::Projects(project_summaries(manager)),
    }
}

fn project_summaries(manager: &Arc<SessionManager>) -> Vec<ProjectSummary> {
    manager
        .project_ids()
        .into_iter()
        .filter_map(|project_id| {
            let config = manager.project_config_snapshot(&project_id)?;
            let all = manager.list_all(Some(&project_id));
            let active = all.iter().filter(|s| !s.is_terminal()).count();
            Some(ProjectSummary {
                project_id: project_id.as_str().to_string(),
                repo_path: config.repo_path,
                runtime: config.runtime,
                agent: config.agent,
                workspace: config.workspace,
                tracker: config.tracker,
                scm: config.scm,
                session_count: all.len(),
                active_session_count: active,
            })
        })
        .collect()
}

fn status_payload(manager: &Arc<SessionManager>, start_time: std::time::Instant) -> DaemonStatusPayload {
    let all = manager.list_all(None);
    let active = all.iter().filter(|s| !s.is_terminal()).count();
    let pool_status = manager.worker_pool_status();
    DaemonStatusPayload {
        version: protocol_wire::PROTOCOL_VERSION.to_string(),
        uptime_secs: start_time.elapsed().as_secs(),
        project_count: manager.project_ids().len(),
        session_count: all.len(),
        active_session_count: active,
        global_active: pool_status.global_active as usize,
        global_max: pool_status.global_max as usize,
    }
}

fn error_response(err: &SessionManagerError) -> Response {
    Response::Error {
        kind: error_kind(err).to_string(),
        message: err.to_string(),
    }
}

fn error_kind(err: &SessionManagerError) -> &'static str {
    match err {
        SessionManagerError::SessionNotFound(_) => "session_not_found",
        SessionManagerError::SpawnDenied { .. } => "spawn_denied",
        SessionManagerError::RateLimited { .. } => "rate_limited",
        SessionManagerError::PluginMissing { .. } => "plugin_missing",
        SessionManagerError::RuntimeDead(_) => "runtime_dead",
        SessionManagerError::WorkspaceExists(_) => "workspace_exists",
        SessionManagerError::ScmTransient(_) => "scm_transient",
        SessionManagerError::MetadataCorrupt(_, _) => "metadata_corrupt",
        SessionManagerError::CycleBreak(_, _) => "cycle_break",
        _ => "internal",
    }
}

fn parse_phase(s: &str) -> Option<Phase> {
    match s {
        "planning" => Some(Phase::Planning),
        "plan_review" => Some(Phase::PlanReview),
        "implementing" => Some(Phase::Implementing),
        "code_review" => Some(Phase::CodeReview),
        "done" => Some(Phase::Done),
        _ => None,
    }
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
