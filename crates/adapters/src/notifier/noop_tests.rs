use super::*;
use ao_core::{EventType, ProjectId};

#[tokio::test]
async fn noop_notify_always_succeeds() {
    let adapter = NoOpNotifyAdapter::new();
    let event = OrchestratorEvent::new("e1", EventType::SessionKilled, ProjectId::from("p1"), 0, "killed");
    adapter.notify(&event).await.unwrap();
}
