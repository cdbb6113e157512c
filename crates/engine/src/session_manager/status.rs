// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic `(activity, PR state, CI, review) -> status` mapping used
//! by the reconciliation loop's step 5. Most-specific rule wins; rules are
//! checked in the order listed below and the first match decides.

use crate::cycle_detector::Verdict;
use ao_core::{Activity, CiStatus, PrInfo, ReviewDecision, SessionStatus};

/// Derives the next `SessionStatus` for a session. `prior_status` is sticky
/// once terminal; `pr` is the most recent `detectPR` result, if any;
/// `cycle_verdict` is the Cycle Detector's latest judgment for this
/// session, if one exists yet.
pub fn derive_status(
    prior_status: SessionStatus,
    activity: Activity,
    pr: Option<&PrInfo>,
    cycle_verdict: Option<Verdict>,
) -> SessionStatus {
    if prior_status.is_terminal() {
        return prior_status;
    }

    if activity == Activity::Exited {
        let pr_existed = pr.is_some() || prior_status == SessionStatus::PrOpen;
        return if pr_existed {
            SessionStatus::Stuck
        } else {
            SessionStatus::Errored
        };
    }

    let Some(pr) = pr else {
        return match (activity, cycle_verdict) {
            (Activity::WaitingInput, _) => SessionStatus::NeedsInput,
            (_, Some(Verdict::Stuck)) => SessionStatus::Stuck,
            _ => SessionStatus::Working,
        };
    };

    if pr.merged {
        return SessionStatus::Merged;
    }
    if pr.closed {
        return SessionStatus::Killed;
    }
    if pr.ci_summary() == CiStatus::Failing {
        return SessionStatus::CiFailed;
    }
    if pr.review_decision == ReviewDecision::ChangesRequested {
        return SessionStatus::ChangesRequested;
    }
    if pr.mergeable
        && pr.review_decision == ReviewDecision::Approved
        && pr.ci_summary() == CiStatus::Passing
    {
        return SessionStatus::Mergeable;
    }
    if matches!(
        pr.review_decision,
        ReviewDecision::Pending | ReviewDecision::ReviewRequired
    ) {
        return SessionStatus::ReviewPending;
    }

    SessionStatus::PrOpen
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
