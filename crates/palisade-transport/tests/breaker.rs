//! Tests for the circuit-breaker decorator.

use bytes::Bytes;
use http::StatusCode;
use http_body_util::Full;
use palisade_breaker::{CircuitBreaker, Settings, State};
use palisade_test::MockTransport;
use palisade_transport::{BreakerTransport, Request, Transport, TransportError};
use std::sync::Arc;

fn get(uri: &str) -> Request {
    http::Request::builder()
        .uri(uri)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

fn trip_after_two_failures() -> Settings {
    Settings {
        trip_policy: Arc::new(|counts| counts.consecutive_failures >= 2),
        ..Settings::default()
    }
}

#[tokio::test]
async fn test_open_gate_short_circuits_the_inner_transport() {
    let mock = Arc::new(MockTransport::new());
    mock.push_error(TransportError::connect("refused"));
    mock.push_error(TransportError::connect("refused"));
    let breaker =
        Arc::new(CircuitBreaker::new("backend", trip_after_two_failures()).unwrap());
    let transport = BreakerTransport::new(mock.clone(), breaker.clone());

    for _ in 0..2 {
        let error = transport.round_trip(get("http://backend/a")).await.unwrap_err();
        assert!(matches!(error, TransportError::Connect { .. }));
    }
    assert_eq!(breaker.state(), State::Open);

    let error = transport.round_trip(get("http://backend/a")).await.unwrap_err();
    assert!(error.is_breaker_open());
    // The third request never reached the inner transport.
    assert_eq!(mock.request_count(), 2);
}

#[tokio::test]
async fn test_server_error_status_is_success_by_default() {
    let mock = Arc::new(MockTransport::new());
    for _ in 0..5 {
        mock.push_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let breaker =
        Arc::new(CircuitBreaker::new("backend", trip_after_two_failures()).unwrap());
    let transport = BreakerTransport::new(mock, breaker.clone());

    for _ in 0..5 {
        let response = transport.round_trip(get("http://backend/a")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert_eq!(breaker.state(), State::Closed);
}

#[tokio::test]
async fn test_classifier_can_trip_on_server_errors() {
    let mock = Arc::new(MockTransport::new());
    for _ in 0..2 {
        mock.push_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let breaker =
        Arc::new(CircuitBreaker::new("backend", trip_after_two_failures()).unwrap());
    let transport = BreakerTransport::new(mock, breaker.clone()).with_classifier(Arc::new(
        |outcome| match outcome {
            Ok(response) => !response.status().is_server_error(),
            Err(_) => false,
        },
    ));

    for _ in 0..2 {
        // The response still reaches the caller even though it counts
        // as a failure.
        let response = transport.round_trip(get("http://backend/a")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
    assert_eq!(breaker.state(), State::Open);
}
