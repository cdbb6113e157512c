// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-session ring history of recent statuses, used to notice a session
//! that's stopped making progress: either stuck on one status (a loop) or
//! bouncing between a small set of statuses (a cycle). The judge is a fixed
//! rule table, not a model call — it only recognizes the alternations named
//! below and otherwise reports `uncertain`.

use ao_core::{SessionId, SessionStatus};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

pub const DEFAULT_RING_CAPACITY: usize = 50;
pub const DEFAULT_MAX_CONSECUTIVE_SAME_STATUS: usize = 5;
pub const DEFAULT_MAX_CYCLE_REPETITIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Productive,
    Stuck,
    Uncertain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    Continue,
    Break,
    Escalate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopDetection {
    pub status: SessionStatus,
    pub length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleDetection {
    pub pattern: Vec<SessionStatus>,
    pub repetitions: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleJudgment {
    pub verdict: Verdict,
    pub recommendation: Recommendation,
    pub reason: String,
    pub suggested_action: Option<String>,
}

/// True iff the last `window` entries of `history` are all identical.
pub fn detect_loop(history: &[SessionStatus], window: usize) -> Option<LoopDetection> {
    if history.len() < window || window == 0 {
        return None;
    }
    let tail = &history[history.len() - window..];
    let first = tail[0];
    if tail.iter().all(|s| *s == first) {
        Some(LoopDetection {
            status: first,
            length: window,
        })
    } else {
        None
    }
}

/// Finds the shortest non-trivial repeating tail pattern (length `2..=len/2`)
/// that repeats at least `min_repetitions` times. A pattern whose entries
/// are all equal is a loop, not a cycle, and is skipped here.
pub fn detect_cycle(history: &[SessionStatus], min_repetitions: usize) -> Option<CycleDetection> {
    let len = history.len();
    for pattern_len in 2..=(len / 2) {
        let pattern = &history[len - pattern_len..];
        if pattern.iter().all(|s| *s == pattern[0]) {
            continue;
        }
        let reps = tail_repetitions(history, pattern);
        if reps >= min_repetitions {
            return Some(CycleDetection {
                pattern: pattern.to_vec(),
                repetitions: reps,
            });
        }
    }
    None
}

/// Counts how many consecutive, non-overlapping copies of `pattern` occupy
/// the tail of `history`.
fn tail_repetitions(history: &[SessionStatus], pattern: &[SessionStatus]) -> usize {
    let pattern_len = pattern.len();
    let mut reps = 0;
    let mut end = history.len();
    while end >= pattern_len {
        let chunk = &history[end - pattern_len..end];
        if chunk == pattern {
            reps += 1;
            end -= pattern_len;
        } else {
            break;
        }
    }
    reps
}

/// Counts alternation repetitions of a specific unordered status pair at
/// the tail, independent of the generic cycle-detection repetition floor —
/// the rule-based judge needs the raw count to decide productive vs. stuck.
fn tail_alternation_reps(history: &[SessionStatus], a: SessionStatus, b: SessionStatus) -> usize {
    if history.len() < 2 {
        return 0;
    }
    let last = history[history.len() - 1];
    let second_last = history[history.len() - 2];
    if last == second_last {
        return 0;
    }
    let set: HashSet<SessionStatus> = [last, second_last].into_iter().collect();
    if set.len() != 2 || !set.contains(&a) || !set.contains(&b) {
        return 0;
    }
    let pattern = [second_last, last];
    tail_repetitions(history, &pattern)
}

struct Inner {
    history: HashMap<SessionId, VecDeque<SessionStatus>>,
}

/// Tracks per-session status history and judges it against a fixed rule
/// table. Single owner; one ring buffer per session.
pub struct CycleDetector {
    capacity: usize,
    max_consecutive_same_status: usize,
    max_cycle_repetitions: usize,
    inner: Mutex<Inner>,
}

impl CycleDetector {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_RING_CAPACITY,
            max_consecutive_same_status: DEFAULT_MAX_CONSECUTIVE_SAME_STATUS,
            max_cycle_repetitions: DEFAULT_MAX_CYCLE_REPETITIONS,
            inner: Mutex::new(Inner {
                history: HashMap::new(),
            }),
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_max_consecutive_same_status(mut self, max: usize) -> Self {
        self.max_consecutive_same_status = max;
        self
    }

    pub fn with_max_cycle_repetitions(mut self, max: usize) -> Self {
        self.max_cycle_repetitions = max;
        self
    }

    pub fn record(&self, session_id: &SessionId, status: SessionStatus) {
        let mut inner = self.inner.lock();
        let ring = inner.history.entry(session_id.clone()).or_default();
        ring.push_back(status);
        while ring.len() > self.capacity {
            ring.pop_front();
        }
    }

    pub fn clear_session(&self, session_id: &SessionId) {
        self.inner.lock().history.remove(session_id);
    }

    fn snapshot(&self, session_id: &SessionId) -> Option<Vec<SessionStatus>> {
        self.inner
            .lock()
            .history
            .get(session_id)
            .map(|ring| ring.iter().copied().collect())
    }

    #[cfg(test)]
    pub(crate) fn snapshot_for_test(&self, session_id: &SessionId) -> Vec<SessionStatus> {
        self.snapshot(session_id).unwrap_or_default()
    }

    pub fn detect_loop(&self, session_id: &SessionId) -> Option<LoopDetection> {
        let hist = self.snapshot(session_id)?;
        detect_loop(&hist, self.max_consecutive_same_status)
    }

    pub fn detect_cycle(&self, session_id: &SessionId) -> Option<CycleDetection> {
        let hist = self.snapshot(session_id)?;
        detect_cycle(&hist, self.max_cycle_repetitions)
    }

    /// Applies the fixed rule table to a session's history. Returns `None`
    /// when nothing resembling a loop or cycle is present yet.
    pub fn judge_cycle(&self, session_id: &SessionId) -> Option<CycleJudgment> {
        let hist = self.snapshot(session_id)?;

        if let Some(loop_det) = detect_loop(&hist, self.max_consecutive_same_status) {
            return Some(CycleJudgment {
                verdict: Verdict::Stuck,
                recommendation: Recommendation::Break,
                reason: format!(
                    "status {} repeated {} times with no change",
                    loop_det.status, loop_det.length
                ),
                suggested_action: Some(
                    "Kill and respawn the session; inspect recent agent output first.".to_string(),
                ),
            });
        }

        let spawn_kill_reps =
            tail_alternation_reps(&hist, SessionStatus::Spawning, SessionStatus::Killed);
        if spawn_kill_reps >= 1 {
            return Some(CycleJudgment {
                verdict: Verdict::Stuck,
                recommendation: Recommendation::Escalate,
                reason: "session keeps failing to start".to_string(),
                suggested_action: Some(
                    "Check runtime plugin health and workspace provisioning.".to_string(),
                ),
            });
        }

        let ci_failed_reps =
            tail_alternation_reps(&hist, SessionStatus::Working, SessionStatus::CiFailed);
        if ci_failed_reps >= 1 {
            return Some(if ci_failed_reps >= self.max_cycle_repetitions {
                CycleJudgment {
                    verdict: Verdict::Stuck,
                    recommendation: Recommendation::Break,
                    reason: format!("working/ci_failed alternated {ci_failed_reps} times"),
                    suggested_action: Some(
                        "Review CI logs manually before retrying.".to_string(),
                    ),
                }
            } else {
                CycleJudgment {
                    verdict: Verdict::Productive,
                    recommendation: Recommendation::Continue,
                    reason: format!(
                        "working/ci_failed alternated {ci_failed_reps} times, below threshold"
                    ),
                    suggested_action: None,
                }
            });
        }

        let changes_requested_reps = tail_alternation_reps(
            &hist,
            SessionStatus::Working,
            SessionStatus::ChangesRequested,
        );
        if changes_requested_reps >= 1 {
            return Some(if changes_requested_reps >= self.max_cycle_repetitions {
                CycleJudgment {
                    verdict: Verdict::Stuck,
                    recommendation: Recommendation::Break,
                    reason: format!(
                        "working/changes_requested alternated {changes_requested_reps} times"
                    ),
                    suggested_action: Some(
                        "Escalate to a human reviewer; the agent isn't converging on review feedback."
                            .to_string(),
                    ),
                }
            } else {
                CycleJudgment {
                    verdict: Verdict::Productive,
                    recommendation: Recommendation::Continue,
                    reason: format!(
                        "working/changes_requested alternated {changes_requested_reps} times, below threshold"
                    ),
                    suggested_action: None,
                }
            });
        }

        detect_cycle(&hist, self.max_cycle_repetitions).map(|cycle| CycleJudgment {
            verdict: Verdict::Uncertain,
            recommendation: Recommendation::Escalate,
            reason: format!(
                "unrecognized repeating pattern {:?} x{}",
                cycle.pattern, cycle.repetitions
            ),
            suggested_action: None,
        })
    }
}

impl Default for CycleDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "cycle_detector_tests.rs"]
mod tests;
