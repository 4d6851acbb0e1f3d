//! Tests for the client metrics decorator.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use palisade_test::MockTransport;
use palisade_transport::{MetricsTransport, Transport, TransportError};
use std::sync::Arc;

#[tokio::test]
async fn test_response_passes_through_unchanged() {
    let mock = Arc::new(MockTransport::new());
    mock.push_status(StatusCode::ACCEPTED);
    let transport = MetricsTransport::new(mock, "payments");

    let request = http::Request::builder()
        .method("POST")
        .uri("http://payments/charge")
        .body(Full::new(Bytes::from("amount=5")))
        .unwrap();
    let response = transport.round_trip(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn test_error_passes_through() {
    let mock = Arc::new(MockTransport::new());
    mock.push_error(TransportError::connect("refused"));
    let transport = MetricsTransport::new(mock, "payments");

    let request = http::Request::builder()
        .uri("http://payments/charge")
        .body(Full::new(Bytes::new()))
        .unwrap();
    assert!(transport.round_trip(request).await.is_err());
}
