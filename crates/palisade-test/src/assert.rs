//! Body assertion helpers.
//!
//! Responses in this collection carry `Full<Bytes>` bodies whose collect
//! error is uninhabited; these helpers hide the resulting boilerplate in
//! tests.

use bytes::Bytes;
use http_body_util::BodyExt;
use palisade_core::Response;
use serde::de::DeserializeOwned;

/// Collects a response body into bytes.
pub async fn body_bytes(response: Response) -> Bytes {
    match response.into_body().collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    }
}

/// Collects a response body into a string.
///
/// # Panics
///
/// Panics when the body is not valid UTF-8.
pub async fn body_string(response: Response) -> String {
    let bytes = body_bytes(response).await;
    String::from_utf8(bytes.to_vec()).expect("response body should be valid UTF-8")
}

/// Collects and deserializes a JSON response body.
///
/// # Panics
///
/// Panics when the body does not deserialize into `T`.
pub async fn body_json<T: DeserializeOwned>(response: Response) -> T {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}
