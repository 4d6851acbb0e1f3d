//! # Palisade Transport
//!
//! Decorators for outbound HTTP clients. A [`Transport`] performs one HTTP
//! round trip; each decorator wraps an inner transport and adds one
//! concern, so a client is assembled by stacking:
//!
//! ```
//! use palisade_transport::{
//!     BasicAuthTransport, LoggingTransport, LoggingTransportOptions, TimeoutTransport,
//! };
//! use palisade_test::MockTransport;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let base = Arc::new(MockTransport::new());
//! let client = LoggingTransport::new(
//!     Arc::new(TimeoutTransport::new(
//!         Arc::new(BasicAuthTransport::new(base, "svc", "s3cret")),
//!         Duration::from_secs(10),
//!     )),
//!     LoggingTransportOptions::default(),
//! );
//! # let _ = client;
//! ```
//!
//! Response statuses are never errors at this layer; [`TransportError`] is
//! reserved for failures to complete the round trip at all.

#![doc(html_root_url = "https://docs.rs/palisade-transport/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod basic_auth;
mod breaker;
mod error;
mod logging;
mod metrics;
mod request_id;
mod timeout;
mod transport;

pub use basic_auth::BasicAuthTransport;
pub use breaker::{BreakerTransport, ResponseClassifier};
pub use error::TransportError;
pub use logging::{LoggingTransport, LoggingTransportOptions};
pub use metrics::MetricsTransport;
pub use request_id::RequestIdTransport;
pub use timeout::TimeoutTransport;
pub use transport::{BoxFuture, Transport};

pub use palisade_core::{Request, Response};
