use super::*;

#[tokio::test]
async fn noop_runtime_never_reports_alive() {
    let adapter = NoOpRuntimeAdapter::new();
    let cfg = RuntimeLaunchConfig {
        name: "proj".to_string(),
        cwd: "/tmp".into(),
        command: "true".to_string(),
        env: Vec::new(),
    };
    let handle = adapter.create(&cfg).await.unwrap();
    assert!(!adapter.is_alive(&handle).await.unwrap());
    assert_eq!(adapter.get_output(&handle, None).await.unwrap(), "");
}
