use super::*;

fn cfg(name: &str) -> RuntimeLaunchConfig {
    RuntimeLaunchConfig {
        name: name.to_string(),
        cwd: "/tmp".into(),
        command: "true".to_string(),
        env: Vec::new(),
    }
}

#[tokio::test]
async fn create_then_destroy_flips_alive_and_records_calls() {
    let adapter = FakeRuntimeAdapter::new();
    let handle = adapter.create(&cfg("proj")).await.unwrap();
    assert!(adapter.is_alive(&handle).await.unwrap());

    adapter.destroy(&handle).await.unwrap();
    assert!(!adapter.is_alive(&handle).await.unwrap());

    let calls = adapter.calls();
    assert_eq!(calls.len(), 2);
}

#[tokio::test]
async fn send_message_to_unknown_handle_errors() {
    let adapter = FakeRuntimeAdapter::new();
    let handle = RuntimeHandle {
        id: "ghost".to_string(),
        runtime_name: "fake".to_string(),
    };
    let err = adapter.send_message(&handle, "hi").await.unwrap_err();
    assert!(matches!(err, RuntimeError::NotFound(_)));
}

#[tokio::test]
async fn set_output_is_reflected_in_get_output() {
    let adapter = FakeRuntimeAdapter::new();
    let handle = adapter.create(&cfg("proj")).await.unwrap();
    adapter.set_output(&handle.id, "agent done");
    assert_eq!(adapter.get_output(&handle, None).await.unwrap(), "agent done");
}
