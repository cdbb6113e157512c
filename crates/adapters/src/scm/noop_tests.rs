use super::*;
use ao_core::Session;

#[tokio::test]
async fn noop_scm_never_detects_a_pr() {
    let adapter = NoOpScmAdapter::new();
    let session = Session::builder("s1", "p1").build();
    let pr = adapter.detect_pr(&session, &ProjectId::from("p1")).await.unwrap();
    assert!(pr.is_none());
}
