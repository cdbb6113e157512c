use super::*;

#[test]
fn request_serializes_with_a_type_tag() {
    let req = Request::SessionSend {
        id: "sess-1".to_string(),
        message: "go".to_string(),
    };
    let json = serde_json::to_value(&req).expect("serialize");
    assert_eq!(json["type"], "SessionSend");
    assert_eq!(json["id"], "sess-1");
}

#[test]
fn query_round_trips_through_json() {
    let query = Query::ListSessions {
        project_id: Some("proj-1".to_string()),
    };
    let json = serde_json::to_string(&query).expect("serialize");
    let decoded: Query = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, query);
}

#[test]
fn missing_defaulted_fields_deserialize_cleanly() {
    let json = r#"{"type":"SpawnSession","project_id":"proj-1"}"#;
    let req: Request = serde_json::from_str(json).expect("deserialize");
    match req {
        Request::SpawnSession {
            project_id,
            issue_id,
            prompt,
            phase,
            model,
            extra_args,
        } => {
            assert_eq!(project_id, "proj-1");
            assert!(issue_id.is_none());
            assert!(prompt.is_none());
            assert!(phase.is_none());
            assert!(model.is_none());
            assert!(extra_args.is_empty());
        }
        other => panic!("unexpected request: {other:?}"),
    }
}

#[test]
fn error_response_carries_kind_and_message() {
    let resp = Response::Error {
        kind: "spawn_denied".to_string(),
        message: "global cap reached".to_string(),
    };
    let json = serde_json::to_value(&resp).expect("serialize");
    assert_eq!(json["kind"], "spawn_denied");
}
