use super::*;

#[tokio::test]
async fn succeeding_command_returns_output() {
    let mut cmd = Command::new("true");
    cmd.kill_on_drop(true);
    let output = run_with_timeout(cmd, Duration::from_secs(5), "true").await.unwrap();
    assert!(output.status.success());
}

#[tokio::test]
async fn slow_command_times_out() {
    let mut cmd = Command::new("sleep");
    cmd.arg("5");
    cmd.kill_on_drop(true);
    let err = run_with_timeout(cmd, Duration::from_millis(50), "sleep")
        .await
        .unwrap_err();
    assert!(err.contains("timed out"));
}

#[tokio::test]
async fn missing_binary_reports_description() {
    let cmd = Command::new("ao-adapters-definitely-not-a-real-binary");
    let err = run_with_timeout(cmd, Duration::from_secs(5), "missing-binary")
        .await
        .unwrap_err();
    assert!(err.contains("missing-binary"));
}
