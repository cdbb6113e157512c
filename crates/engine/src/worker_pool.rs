// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission control for session spawning: a single-owner, per-session-set
//! view of how many sessions are active globally and per project, checked
//! before every spawn. Global check always precedes the project check, so
//! exhausting the global budget reports `global` even when a project
//! override would otherwise allow more.

use ao_core::{ProjectId, Session, SessionId};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// Default maximum number of sessions active across all projects.
pub const DEFAULT_GLOBAL_MAX: u32 = 10;
/// Default per-project maximum, absent a config override.
pub const DEFAULT_PROJECT_MAX: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitHit {
    Global,
    Project,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub can_spawn: bool,
    pub limit_hit: Option<LimitHit>,
    pub reason: Option<String>,
    /// Slots left for this project after a hypothetical admission right now.
    /// Zero when admission is denied.
    pub slots_remaining: u32,
}

#[derive(Debug, Clone)]
pub struct WorkerPoolStatus {
    pub global_max: u32,
    pub global_active: u32,
    pub project_max_default: u32,
    pub project_active: HashMap<ProjectId, u32>,
    pub project_overrides: HashMap<ProjectId, u32>,
}

struct Inner {
    global_max: u32,
    project_max_default: u32,
    project_overrides: HashMap<ProjectId, u32>,
    active_by_project: HashMap<ProjectId, HashSet<SessionId>>,
}

impl Inner {
    fn global_active(&self) -> u32 {
        self.active_by_project.values().map(|s| s.len() as u32).sum()
    }

    fn project_active(&self, project_id: &ProjectId) -> u32 {
        self.active_by_project
            .get(project_id)
            .map(|s| s.len() as u32)
            .unwrap_or(0)
    }

    fn project_max(&self, project_id: &ProjectId) -> u32 {
        self.project_overrides
            .get(project_id)
            .copied()
            .unwrap_or(self.project_max_default)
    }
}

/// Tracks active session counts and enforces global/per-project concurrency
/// caps. Single owner; fine-grained locking isn't needed since admission is
/// a short, uncontended critical section.
pub struct WorkerPool {
    inner: Mutex<Inner>,
}

impl WorkerPool {
    pub fn new(global_max: u32, project_max_default: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                global_max,
                project_max_default,
                project_overrides: HashMap::new(),
                active_by_project: HashMap::new(),
            }),
        }
    }

    pub fn set_project_max(&self, project_id: ProjectId, max: u32) {
        self.inner.lock().project_overrides.insert(project_id, max);
    }

    /// Checks whether a new session may be spawned for `project_id` without
    /// recording it. Global limit is checked first: a project with its own
    /// override is still blocked if the global budget is exhausted.
    ///
    /// This is a point-in-time read for status queries (e.g. "would a spawn
    /// succeed right now?"); a concurrent `try_reserve` can still land
    /// between this call and any action the caller takes on it. Real spawns
    /// must use `try_reserve` instead.
    pub fn can_spawn(&self, project_id: &ProjectId) -> AdmissionDecision {
        let inner = self.inner.lock();
        let global_active = inner.global_active();
        let project_active = inner.project_active(project_id);
        let project_max = inner.project_max(project_id);

        if global_active >= inner.global_max {
            return AdmissionDecision {
                can_spawn: false,
                limit_hit: Some(LimitHit::Global),
                reason: Some(format!(
                    "global session limit reached ({global_active}/{})",
                    inner.global_max
                )),
                slots_remaining: 0,
            };
        }
        if project_active >= project_max {
            return AdmissionDecision {
                can_spawn: false,
                limit_hit: Some(LimitHit::Project),
                reason: Some(format!(
                    "project session limit reached ({project_active}/{project_max})"
                )),
                slots_remaining: 0,
            };
        }

        let global_headroom = inner.global_max - global_active;
        let project_headroom = project_max - project_active;
        let slots_remaining = global_headroom.min(project_headroom).saturating_sub(1);

        AdmissionDecision {
            can_spawn: true,
            limit_hit: None,
            reason: None,
            slots_remaining,
        }
    }

    /// Checks admission and, if granted, records `session_id` as active in
    /// the same critical section — the check and the reservation never see
    /// an interleaved writer, unlike calling `can_spawn` then `record_spawn`
    /// as two separate locks. Callers must still release the reservation
    /// with `record_exit` if the rest of the spawn fails afterwards.
    pub fn try_reserve(&self, project_id: &ProjectId, session_id: &SessionId) -> AdmissionDecision {
        let mut inner = self.inner.lock();
        let global_active = inner.global_active();
        let project_active = inner.project_active(project_id);
        let project_max = inner.project_max(project_id);

        if global_active >= inner.global_max {
            return AdmissionDecision {
                can_spawn: false,
                limit_hit: Some(LimitHit::Global),
                reason: Some(format!(
                    "global session limit reached ({global_active}/{})",
                    inner.global_max
                )),
                slots_remaining: 0,
            };
        }
        if project_active >= project_max {
            return AdmissionDecision {
                can_spawn: false,
                limit_hit: Some(LimitHit::Project),
                reason: Some(format!(
                    "project session limit reached ({project_active}/{project_max})"
                )),
                slots_remaining: 0,
            };
        }

        inner
            .active_by_project
            .entry(project_id.clone())
            .or_default()
            .insert(session_id.clone());

        let global_headroom = inner.global_max - global_active - 1;
        let project_headroom = project_max - project_active - 1;
        let slots_remaining = global_headroom.min(project_headroom);

        AdmissionDecision {
            can_spawn: true,
            limit_hit: None,
            reason: None,
            slots_remaining,
        }
    }

    /// Records a newly admitted session. Idempotent: re-recording the same
    /// `(project_id, session_id)` pair is a no-op.
    ///
    /// Prefer `try_reserve` for real spawns — this is a separate, non-atomic
    /// check+insert and exists for `sync_from_sessions`-adjacent callers that
    /// already hold their own serialization.
    pub fn record_spawn(&self, project_id: &ProjectId, session_id: &SessionId) {
        self.inner
            .lock()
            .active_by_project
            .entry(project_id.clone())
            .or_default()
            .insert(session_id.clone());
    }

    /// Records a session's exit. Idempotent: removing a session that was
    /// never recorded (or already removed) is a no-op.
    pub fn record_exit(&self, project_id: &ProjectId, session_id: &SessionId) {
        let mut inner = self.inner.lock();
        if let Some(set) = inner.active_by_project.get_mut(project_id) {
            set.remove(session_id);
            if set.is_empty() {
                inner.active_by_project.remove(project_id);
            }
        }
    }

    /// Rebuilds active-session bookkeeping from a fresh session list,
    /// discarding any prior state. A session counts as active unless its
    /// status is terminal.
    pub fn sync_from_sessions(&self, sessions: &[Session]) {
        let mut inner = self.inner.lock();
        inner.active_by_project.clear();
        for session in sessions {
            if session.is_terminal() {
                continue;
            }
            inner
                .active_by_project
                .entry(session.project_id.clone())
                .or_default()
                .insert(session.id.clone());
        }
    }

    pub fn get_status(&self) -> WorkerPoolStatus {
        let inner = self.inner.lock();
        let project_active = inner
            .active_by_project
            .iter()
            .map(|(project_id, set)| (project_id.clone(), set.len() as u32))
            .collect();
        WorkerPoolStatus {
            global_max: inner.global_max,
            global_active: inner.global_active(),
            project_max_default: inner.project_max_default,
            project_active,
            project_overrides: inner.project_overrides.clone(),
        }
    }

    /// Drops all active-session bookkeeping. Limits and overrides survive.
    pub fn clear(&self) {
        self.inner.lock().active_by_project.clear();
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_GLOBAL_MAX, DEFAULT_PROJECT_MAX)
    }
}

#[cfg(test)]
#[path = "worker_pool_tests.rs"]
mod tests;
