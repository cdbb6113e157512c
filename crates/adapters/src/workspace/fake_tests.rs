use super::*;

fn cfg(project: &str, branch: &str) -> WorkspaceCreateConfig {
    WorkspaceCreateConfig {
        project_id: ProjectId::from(project),
        repo_path: "/repo".into(),
        branch: branch.to_string(),
    }
}

#[tokio::test]
async fn create_then_list_returns_created_workspace() {
    let adapter = FakeWorkspaceAdapter::new();
    let info = adapter.create(&cfg("p1", "agent/1")).await.unwrap();
    assert!(adapter.exists(&info.path).await.unwrap());

    let listed = adapter.list(&ProjectId::from("p1")).await.unwrap();
    assert_eq!(listed, vec![info]);
}

#[tokio::test]
async fn destroy_removes_from_list() {
    let adapter = FakeWorkspaceAdapter::new();
    let info = adapter.create(&cfg("p1", "agent/1")).await.unwrap();
    adapter.destroy(&info.path).await.unwrap();
    assert!(adapter.list(&ProjectId::from("p1")).await.unwrap().is_empty());
}
