use super::*;

#[test]
fn terminal_statuses_match_spec_list() {
    assert!(SessionStatus::Merged.is_terminal());
    assert!(SessionStatus::Killed.is_terminal());
    assert!(SessionStatus::Cleanup.is_terminal());
    assert!(SessionStatus::Done.is_terminal());
    assert!(SessionStatus::Terminated.is_terminal());
    assert!(!SessionStatus::Working.is_terminal());
    assert!(!SessionStatus::PrOpen.is_terminal());
}

#[test]
fn set_status_updates_metadata_mirror() {
    let mut session = Session::builder("proj-1", "proj").build();
    session.set_status(SessionStatus::Working);
    assert_eq!(session.metadata.get("status").map(String::as_str), Some("working"));
}

#[test]
fn set_branch_updates_both_typed_field_and_metadata() {
    let mut session = Session::builder("proj-1", "proj").build();
    session.set_branch("agent/proj-1");
    assert_eq!(session.branch.as_deref(), Some("agent/proj-1"));
    assert_eq!(
        session.metadata.get("branch").map(String::as_str),
        Some("agent/proj-1")
    );
}

#[test]
fn review_round_defaults_to_zero_and_round_trips() {
    let mut session = Session::builder("proj-1", "proj").build();
    assert_eq!(session.review_round(), 0);
    session.set_review_round(3);
    assert_eq!(session.review_round(), 3);
}
