//! # Palisade Breaker
//!
//! A circuit-breaking call gate. The gate sits between a caller that wants
//! to perform an outbound operation and the real execution path, and decides
//! per call whether the operation may run at all, feeding each outcome back
//! into its health state.
//!
//! # States
//!
//! - **Closed**: normal operation, calls pass through and outcomes are
//!   tallied within a rolling counting interval
//! - **Open**: the downstream is presumed unhealthy, calls fail fast without
//!   running the operation
//! - **Half-Open**: a bounded number of probe calls test whether the
//!   downstream recovered
//!
//! # State Transitions
//!
//! ```text
//! Closed → Open: trip policy over the interval's counts returns true
//! Open → Half-Open: open timeout elapsed (evaluated lazily on the next call)
//! Half-Open → Closed: max_half_open_requests successful probes
//! Half-Open → Open: any single failing probe
//! ```
//!
//! There are no background timers; a quiescent gate holds its state until
//! the next call (or state inspection) re-evaluates the clock.
//!
//! # Example
//!
//! ```
//! use palisade_breaker::{CircuitBreaker, Settings};
//!
//! # #[derive(Debug)] struct DownstreamError;
//! # impl std::fmt::Display for DownstreamError {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//! #         write!(f, "downstream error")
//! #     }
//! # }
//! # async fn fetch() -> Result<String, DownstreamError> { Ok("ok".into()) }
//! # async fn demo() {
//! let breaker = CircuitBreaker::new("backend", Settings::default()).unwrap();
//!
//! match breaker.call(fetch).await {
//!     Ok(body) => println!("got {body}"),
//!     Err(err) if err.is_rejection() => println!("failing fast: {err}"),
//!     Err(err) => println!("downstream failed: {err}"),
//! }
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/palisade-breaker/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod breaker;
mod counts;
mod error;
mod settings;

pub use breaker::{CircuitBreaker, State};
pub use counts::Counts;
pub use error::BreakerError;
pub use settings::{Settings, SettingsError, TripPolicy};
