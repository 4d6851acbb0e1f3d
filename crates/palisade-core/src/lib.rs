//! # Palisade Core
//!
//! Shared types for the Palisade middleware and transport-decorator
//! collection:
//!
//! - [`Request`] / [`Response`] - the HTTP types flowing through middleware
//! - [`RequestId`] - UUID v7 request identifier
//! - [`PalisadeError`] - standard error taxonomy with HTTP status mapping
//! - [`ErrorEnvelope`] - the serializable error body written by middleware
//! - [`header`] - header name constants shared across crates

#![doc(html_root_url = "https://docs.rs/palisade-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod header;
mod request_id;
mod types;

pub use error::{ErrorCategory, ErrorDetail, ErrorEnvelope, PalisadeError, PalisadeResult};
pub use request_id::RequestId;
pub use types::{Request, Response, ResponseExt};
