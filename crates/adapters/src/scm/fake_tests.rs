use super::*;
use ao_core::Session;

fn pr(number: u64) -> PrInfo {
    PrInfo {
        number,
        url: format!("https://scm.test/pr/{number}"),
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        head_branch: "agent/1".to_string(),
        base_branch: "main".to_string(),
        draft: false,
        additions: 10,
        deletions: 2,
        ci_checks: Vec::new(),
        review_decision: ReviewDecision::Pending,
        mergeable: true,
        merged: false,
        closed: false,
        unresolved_comment_count: 0,
    }
}

#[tokio::test]
async fn detect_pr_returns_registered_pr_for_session() {
    let adapter = FakeScmAdapter::new();
    adapter.set_pr_for_session("s1", pr(42));
    let session = Session::builder("s1", "p1").build();
    let found = adapter.detect_pr(&session, &ProjectId::from("p1")).await.unwrap();
    assert_eq!(found.unwrap().number, 42);
}

#[tokio::test]
async fn merge_pr_records_the_merged_number() {
    let adapter = FakeScmAdapter::new();
    adapter.merge_pr(&pr(7), None).await.unwrap();
    assert_eq!(adapter.merged_pr_numbers(), vec![7]);
}
