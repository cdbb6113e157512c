// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ao` - Agent Orchestrator CLI
//!
//! Thin client over `aod`'s Unix socket. Exists to prove the daemon's
//! surface is callable end-to-end; carries no reaction/phase logic of its
//! own.

mod client;
mod daemon_process;
mod env;
mod output;

use ao_daemon::{Query, Request, Response};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::client::DaemonClient;

#[derive(Parser)]
#[command(name = "ao", version, about = "Agent Orchestrator - a fleet supervisor for coding-agent sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Spawn a new coding-agent session
    Spawn {
        /// Project identifier (must already be registered)
        project_id: String,
        /// Tracker issue id to work from
        #[arg(long)]
        issue: Option<String>,
        /// Initial prompt for the agent
        #[arg(long)]
        prompt: Option<String>,
        /// Starting phase (defaults to the project's initial phase)
        #[arg(long)]
        phase: Option<String>,
        /// Agent model override
        #[arg(long)]
        model: Option<String>,
    },
    /// Send a message to a running session's agent
    Send {
        /// Session id
        id: String,
        /// Message text
        message: String,
    },
    /// Kill a session
    Kill {
        /// Session id
        id: String,
        /// Optional reason, recorded on the session
        #[arg(long)]
        reason: Option<String>,
    },
    /// Tear down terminal sessions
    Cleanup {
        /// Restrict to one project
        #[arg(long)]
        project: Option<String>,
    },
    /// Rehydrate a session from its on-disk record
    Restore {
        /// Session id
        id: String,
    },
    /// Show daemon-wide status, or one session's detail with --id
    Status {
        /// Show detail for a single session instead of the daemon summary
        #[arg(long)]
        id: Option<String>,
    },
    /// List sessions
    List {
        /// Restrict to one project
        #[arg(long)]
        project: Option<String>,
        /// Include terminal sessions
        #[arg(long)]
        all: bool,
    },
    /// List registered projects
    Projects,
    /// Register (or re-register) a project's plugin wiring
    Register {
        /// Project identifier
        project_id: String,
        /// Path to the project's repository checkout
        repo_path: std::path::PathBuf,
        /// Runtime plugin name (e.g. "tmux")
        #[arg(long, default_value = "tmux")]
        runtime: String,
        /// Agent plugin name
        #[arg(long, default_value = "noop")]
        agent: String,
        /// Workspace plugin name (e.g. "git-worktree")
        #[arg(long, default_value = "git-worktree")]
        workspace: String,
        /// Tracker plugin name
        #[arg(long)]
        tracker: Option<String>,
        /// SCM plugin name
        #[arg(long)]
        scm: Option<String>,
        /// Skip the review phase for sessions in this project
        #[arg(long)]
        simple_mode: bool,
        /// Automatically request review on phase completion
        #[arg(long)]
        auto_review: bool,
    },
    /// Ask the daemon to shut down
    Shutdown,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Spawn {
            project_id,
            issue,
            prompt,
            phase,
            model,
        } => {
            let client = DaemonClient::for_action().await?;
            let response = client
                .call_checked(Request::SpawnSession {
                    project_id,
                    issue_id: issue,
                    prompt,
                    phase,
                    model,
                    extra_args: Vec::new(),
                })
                .await?;
            expect_session(response).map(|d| output::print_session_detail(&d))
        }
        Commands::Send { id, message } => {
            let client = DaemonClient::for_action().await?;
            client.call_checked(Request::SessionSend { id, message }).await?;
            println!("sent");
            Ok(())
        }
        Commands::Kill { id, reason } => {
            let client = DaemonClient::for_action().await?;
            let response = client.call_checked(Request::SessionKill { id, reason }).await?;
            expect_session(response).map(|d| output::print_session_detail(&d))
        }
        Commands::Cleanup { project } => {
            let client = DaemonClient::for_action().await?;
            let response = client
                .call_checked(Request::SessionCleanup { project_id: project })
                .await?;
            match response {
                Response::SessionIds(ids) => {
                    println!("cleaned up {} session(s)", ids.len());
                    for id in ids {
                        println!("  {id}");
                    }
                    Ok(())
                }
                other => Err(unexpected(other)),
            }
        }
        Commands::Restore { id } => {
            let client = DaemonClient::for_action().await?;
            let response = client.call_checked(Request::SessionRestore { id }).await?;
            expect_session(response).map(|d| output::print_session_detail(&d))
        }
        Commands::Status { id: Some(id) } => {
            let client = DaemonClient::for_query().await?;
            let response = client.call_checked(Request::Query { query: Query::GetSession { id } }).await?;
            expect_session(response).map(|d| output::print_session_detail(&d))
        }
        Commands::Status { id: None } => {
            let client = DaemonClient::for_query().await?;
            let response = client.call_checked(Request::Status).await?;
            match response {
                Response::Status(status) => {
                    output::print_status(&status);
                    Ok(())
                }
                other => Err(unexpected(other)),
            }
        }
        Commands::List { project, all } => {
            let client = DaemonClient::for_query().await?;
            let query = if all {
                Query::ListAllSessions { project_id: project }
            } else {
                Query::ListSessions { project_id: project }
            };
            let response = client.call_checked(Request::Query { query }).await?;
            match response {
                Response::Sessions(sessions) => {
                    output::print_session_summaries(&sessions);
                    Ok(())
                }
                other => Err(unexpected(other)),
            }
        }
        Commands::Projects => {
            let client = DaemonClient::for_query().await?;
            let response = client.call_checked(Request::Query { query: Query::ListProjects }).await?;
            match response {
                Response::Projects(projects) => {
                    output::print_project_summaries(&projects);
                    Ok(())
                }
                other => Err(unexpected(other)),
            }
        }
        Commands::Register {
            project_id,
            repo_path,
            runtime,
            agent,
            workspace,
            tracker,
            scm,
            simple_mode,
            auto_review,
        } => {
            let client = DaemonClient::for_action().await?;
            client
                .call_checked(Request::RegisterProject {
                    project_id,
                    repo_path,
                    runtime,
                    agent,
                    workspace,
                    tracker,
                    scm,
                    simple_mode,
                    auto_review_enabled: auto_review,
                })
                .await?;
            println!("registered");
            Ok(())
        }
        Commands::Shutdown => {
            let client = DaemonClient::for_query().await?;
            client.call(Request::Shutdown).await?;
            println!("daemon shutting down");
            Ok(())
        }
    }
}

fn expect_session(response: Response) -> Result<ao_daemon::SessionDetail> {
    match response {
        Response::Session(detail) => Ok(detail),
        other => Err(unexpected(other)),
    }
}

fn unexpected(response: Response) -> anyhow::Error {
    anyhow!("unexpected response from daemon: {response:?}")
}
