use super::*;

#[tokio::test]
async fn noop_tracker_synthesizes_issue_and_branch() {
    let adapter = NoOpTrackerAdapter::new();
    let project_id = ProjectId::from("p1");
    let issue = adapter.get_issue("ISSUE-1", &project_id).await.unwrap();
    assert_eq!(issue.id, "ISSUE-1");
    assert_eq!(adapter.branch_name("ISSUE-1", &project_id), "agent/ISSUE-1");
    assert!(!adapter.is_completed("ISSUE-1", &project_id).await.unwrap());
}
