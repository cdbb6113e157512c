use super::*;
use ao_core::{Activity, Phase, RuntimeHandle, SessionStatus};

#[test]
fn summary_carries_string_typed_fields() {
    let session = Session::builder("sess-1", "proj-1")
        .status(SessionStatus::Working)
        .activity(Activity::Active)
        .phase(Phase::Implementing)
        .branch("ao/sess-1")
        .build();

    let summary = SessionSummary::from(&session);
    assert_eq!(summary.id, "sess-1");
    assert_eq!(summary.project_id, "proj-1");
    assert_eq!(summary.status, "working");
    assert_eq!(summary.activity, "active");
    assert_eq!(summary.phase, "implementing");
    assert_eq!(summary.branch.as_deref(), Some("ao/sess-1"));
}

#[test]
fn detail_surfaces_runtime_and_agent_info() {
    let mut session = Session::builder("sess-2", "proj-1")
        .status(SessionStatus::Working)
        .activity(Activity::Active)
        .phase(Phase::Implementing)
        .runtime_handle(RuntimeHandle {
            id: "handle-1".to_string(),
            runtime_name: "tmux".to_string(),
            data: Default::default(),
        })
        .build();
    session.agent_info = Some(ao_core::AgentInfo {
        summary: Some("writing tests".to_string()),
        summary_is_fallback: false,
        agent_session_id: Some("agent-9".to_string()),
        cost: Some(ao_core::AgentCost {
            input_tokens: 10,
            output_tokens: 5,
            usd: 0.01,
        }),
    });

    let detail = SessionDetail::from(&session);
    assert_eq!(detail.runtime_name.as_deref(), Some("tmux"));
    assert_eq!(detail.agent_summary.as_deref(), Some("writing tests"));
    assert_eq!(detail.agent_session_id.as_deref(), Some("agent-9"));
    assert!((detail.cost_usd.unwrap() - 0.01).abs() < f64::EPSILON);
}
