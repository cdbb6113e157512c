use super::*;

fn check(status: CiStatus) -> CiCheck {
    CiCheck {
        name: "build".to_string(),
        status,
        url: None,
    }
}

fn pr_with_checks(checks: Vec<CiCheck>) -> PrInfo {
    PrInfo {
        number: 1,
        url: "https://example.com/pr/1".to_string(),
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        head_branch: "agent/1".to_string(),
        base_branch: "main".to_string(),
        draft: false,
        additions: 10,
        deletions: 2,
        ci_checks: checks,
        review_decision: ReviewDecision::Pending,
        mergeable: true,
        merged: false,
        closed: false,
        unresolved_comment_count: 0,
    }
}

#[test]
fn ci_summary_is_unknown_with_no_checks() {
    assert_eq!(pr_with_checks(vec![]).ci_summary(), CiStatus::Unknown);
}

#[test]
fn ci_summary_fails_if_any_check_fails() {
    let pr = pr_with_checks(vec![check(CiStatus::Passing), check(CiStatus::Failing)]);
    assert_eq!(pr.ci_summary(), CiStatus::Failing);
}

#[test]
fn ci_summary_pending_if_any_check_pending_and_none_failing() {
    let pr = pr_with_checks(vec![check(CiStatus::Passing), check(CiStatus::Pending)]);
    assert_eq!(pr.ci_summary(), CiStatus::Pending);
}

#[test]
fn ci_summary_passing_when_all_pass() {
    let pr = pr_with_checks(vec![check(CiStatus::Passing), check(CiStatus::Passing)]);
    assert_eq!(pr.ci_summary(), CiStatus::Passing);
}
