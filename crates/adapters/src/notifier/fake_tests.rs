use super::*;
use ao_core::{EventType, ProjectId};

#[tokio::test]
async fn notify_records_event_id() {
    let adapter = FakeNotifyAdapter::new();
    let event = OrchestratorEvent::new("e1", EventType::EscalationRequired, ProjectId::from("p1"), 0, "stuck");
    adapter.notify(&event).await.unwrap();
    assert!(matches!(adapter.calls().as_slice(), [NotifyCall::Notify { event_id }] if event_id == "e1"));
}

#[tokio::test]
async fn post_returns_a_message_id() {
    let adapter = FakeNotifyAdapter::new();
    let id = adapter.post("hello", None).await.unwrap();
    assert_eq!(id, Some("fake-message-id".to_string()));
}
