use super::*;
use ao_core::Session;

#[tokio::test]
async fn open_session_marks_it_open() {
    let adapter = FakeTerminalAdapter::new();
    let session = Session::builder("s1", "p1").build();
    assert!(!adapter.is_session_open(&session).await.unwrap());
    adapter.open_session(&session).await.unwrap();
    assert!(adapter.is_session_open(&session).await.unwrap());
}

#[tokio::test]
async fn open_all_opens_every_session() {
    let adapter = FakeTerminalAdapter::new();
    let sessions = vec![
        Session::builder("s1", "p1").build(),
        Session::builder("s2", "p1").build(),
    ];
    adapter.open_all(&sessions).await.unwrap();
    assert_eq!(adapter.opened_session_ids().len(), 2);
}
