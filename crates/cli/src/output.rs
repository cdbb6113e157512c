// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal, dependency-free output formatting. Not a real table renderer —
//! this CLI exists to prove the daemon's surface is callable, not to be a
//! polished terminal UI.

use ao_daemon::{DaemonStatusPayload, ProjectSummary, SessionDetail, SessionSummary};

pub fn print_session_summaries(sessions: &[SessionSummary]) {
    if sessions.is_empty() {
        println!("no sessions");
        return;
    }
    println!("{:<14} {:<12} {:<10} {:<12} {:<10} BRANCH", "ID", "PROJECT", "STATUS", "ACTIVITY", "PHASE");
    for s in sessions {
        println!(
            "{:<14} {:<12} {:<10} {:<12} {:<10} {}",
            short(&s.id),
            short(&s.project_id),
            s.status,
            s.activity,
            s.phase,
            s.branch.as_deref().unwrap_or("-")
        );
    }
}

pub fn print_session_detail(detail: &SessionDetail) {
    println!("id:          {}", detail.summary.id);
    println!("project:     {}", detail.summary.project_id);
    println!("status:      {}", detail.summary.status);
    println!("activity:    {}", detail.summary.activity);
    println!("phase:       {}", detail.summary.phase);
    println!("branch:      {}", detail.summary.branch.as_deref().unwrap_or("-"));
    println!("issue:       {}", detail.summary.issue_id.as_deref().unwrap_or("-"));
    println!("workspace:   {}", detail.workspace_path.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "-".to_string()));
    println!("runtime:     {}", detail.runtime_name.as_deref().unwrap_or("-"));
    println!("review:      round {}", detail.review_round);
    if let Some(summary) = &detail.agent_summary {
        println!("agent:       {summary}");
    }
    if let Some(cost) = detail.cost_usd {
        println!("cost:        ${cost:.4}");
    }
}

pub fn print_project_summaries(projects: &[ProjectSummary]) {
    if projects.is_empty() {
        println!("no projects registered");
        return;
    }
    println!("{:<16} {:<10} {:<10} {:<14} SESSIONS (ACTIVE/TOTAL)", "PROJECT", "RUNTIME", "AGENT", "WORKSPACE");
    for p in projects {
        println!(
            "{:<16} {:<10} {:<10} {:<14} {}/{}",
            short(&p.project_id),
            p.runtime,
            p.agent,
            p.workspace,
            p.active_session_count,
            p.session_count
        );
    }
}

pub fn print_status(status: &DaemonStatusPayload) {
    println!("version:          {}", status.version);
    println!("uptime:           {}s", status.uptime_secs);
    println!("projects:         {}", status.project_count);
    println!("sessions:         {} ({} active)", status.session_count, status.active_session_count);
    println!("workers:          {}/{}", status.global_active, status.global_max);
}

fn short(id: &str) -> String {
    if id.len() <= 12 {
        id.to_string()
    } else {
        format!("{}..", &id[..10])
    }
}
