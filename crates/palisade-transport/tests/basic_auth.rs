//! Tests for the basic-auth decorator.

use bytes::Bytes;
use http_body_util::Full;
use palisade_test::MockTransport;
use palisade_transport::{BasicAuthTransport, Request, Transport};
use std::sync::Arc;

fn get(uri: &str) -> Request {
    http::Request::builder()
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

#[tokio::test]
async fn test_sets_authorization_header() {
    let mock = Arc::new(MockTransport::new());
    let transport = BasicAuthTransport::new(mock.clone(), "svc", "s3cret");

    transport.round_trip(get("http://backend/ping")).await.unwrap();

    let seen = mock.requests();
    assert_eq!(seen.len(), 1);
    let value = seen[0]
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    // base64("svc:s3cret")
    assert_eq!(value, "Basic c3ZjOnMzY3JldA==");
}

#[tokio::test]
async fn test_replaces_existing_credentials() {
    let mock = Arc::new(MockTransport::new());
    let transport = BasicAuthTransport::new(mock.clone(), "svc", "s3cret");

    let request = http::Request::builder()
        .uri("http://backend/ping")
        .header(http::header::AUTHORIZATION, "Bearer stale")
        .body(Full::new(Bytes::new()))
        .unwrap();
    transport.round_trip(request).await.unwrap();

    let seen = mock.requests();
    let values: Vec<_> = seen[0].headers.get_all(http::header::AUTHORIZATION).iter().collect();
    assert_eq!(values.len(), 1);
    assert!(values[0].to_str().unwrap().starts_with("Basic "));
}
