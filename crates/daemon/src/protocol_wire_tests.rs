use super::*;
use crate::protocol::{Query, Request, Response};

#[tokio::test]
async fn round_trips_a_request_over_an_in_memory_pipe() {
    let (mut client, mut server) = tokio::io::duplex(4096);

    let req = Request::Query {
        query: Query::ListSessions { project_id: None },
    };
    let bytes = encode(&req).expect("encode");
    write_message(&mut client, &bytes).await.expect("write");

    let received = read_request(&mut server, DEFAULT_TIMEOUT).await.expect("read");
    assert_eq!(received, req);
}

#[tokio::test]
async fn write_response_then_read_message_round_trips() {
    let (mut client, mut server) = tokio::io::duplex(4096);
    let resp = Response::Pong;
    write_response(&mut server, &resp, DEFAULT_TIMEOUT).await.expect("write");

    let bytes = read_message(&mut client).await.expect("read");
    let decoded: Response = decode(&bytes).expect("decode");
    assert_eq!(decoded, resp);
}

#[tokio::test]
async fn reading_from_a_closed_pipe_reports_connection_closed() {
    let (client, mut server) = tokio::io::duplex(4096);
    drop(client);

    let err = read_message(&mut server).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_payload_is_rejected_before_writing() {
    let (mut client, _server) = tokio::io::duplex(4096);
    let big = vec![0u8; MAX_MESSAGE_SIZE + 1];
    let err = write_message(&mut client, &big).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}
