//! # Palisade Test
//!
//! Test doubles for the rest of the collection: a scripted
//! [`MockTransport`] standing in for a real HTTP client, and helpers for
//! asserting on `Full<Bytes>` response bodies.

#![doc(html_root_url = "https://docs.rs/palisade-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod assert;
mod mock;

pub use assert::{body_bytes, body_json, body_string};
pub use mock::{MockTransport, RequestRecord};
