use super::*;
use ao_core::{EventType, ProjectId};

#[tokio::test]
async fn notify_does_not_error_even_without_a_notification_daemon() {
    let adapter = DesktopNotifyAdapter::new();
    let event = OrchestratorEvent::new(
        "evt-1",
        EventType::SessionSpawned,
        ProjectId::from("p1"),
        0,
        "session spawned",
    );
    adapter.notify(&event).await.unwrap();
}
