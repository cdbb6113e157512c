use super::*;
use crate::id::ProjectId;

#[test]
fn escalation_required_defaults_to_urgent() {
    assert_eq!(
        EventType::EscalationRequired.default_priority(),
        EventPriority::Urgent
    );
}

#[test]
fn session_spawned_defaults_to_info() {
    assert_eq!(EventType::SessionSpawned.default_priority(), EventPriority::Info);
}

#[test]
fn builder_attaches_session_and_data() {
    let event = OrchestratorEvent::new(
        "evt-1",
        EventType::PrCiFailed,
        ProjectId::new("proj"),
        1000,
        "CI failed",
    )
    .with_session(SessionId::new("proj-1"))
    .with_data("run_url", serde_json::json!("https://ci/run/1"));

    assert_eq!(event.priority, EventPriority::Action);
    assert_eq!(event.session_id, Some(SessionId::new("proj-1")));
    assert_eq!(event.data.get("run_url").unwrap(), "https://ci/run/1");
}
