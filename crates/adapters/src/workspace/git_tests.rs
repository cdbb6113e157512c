use super::*;
use tempfile::tempdir;
use tokio::process::Command;

async fn init_repo(path: &Path) {
    let run = |args: &[&str]| {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(path).args(args);
        cmd
    };
    run(&["init", "-q"]).output().await.unwrap();
    run(&["config", "user.email", "test@example.com"])
        .output()
        .await
        .unwrap();
    run(&["config", "user.name", "test"]).output().await.unwrap();
    tokio::fs::write(path.join("README.md"), "hello").await.unwrap();
    run(&["add", "."]).output().await.unwrap();
    run(&["commit", "-q", "-m", "init"]).output().await.unwrap();
}

#[tokio::test]
async fn create_list_destroy_round_trips() {
    let repo_dir = tempdir().unwrap();
    init_repo(repo_dir.path()).await;
    let worktree_root = tempdir().unwrap();

    let adapter = GitWorktreeAdapter::new(worktree_root.path());
    let project_id = ao_core::ProjectId::from("proj-1");
    let cfg = WorkspaceCreateConfig {
        project_id: project_id.clone(),
        repo_path: repo_dir.path().to_path_buf(),
        branch: "agent/issue-1".to_string(),
    };

    let info = adapter.create(&cfg).await.unwrap();
    assert!(adapter.exists(&info.path).await.unwrap());

    let listed = adapter.list(&project_id).await.unwrap();
    assert_eq!(listed.len(), 1);

    adapter.destroy(&info.path).await.unwrap();
}

#[tokio::test]
async fn list_for_unknown_project_is_empty() {
    let worktree_root = tempdir().unwrap();
    let adapter = GitWorktreeAdapter::new(worktree_root.path());
    let listed = adapter
        .list(&ao_core::ProjectId::from("nonexistent"))
        .await
        .unwrap();
    assert!(listed.is_empty());
}
