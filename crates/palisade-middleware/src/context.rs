//! Per-request context.
//!
//! [`MiddlewareContext`] is the mutable state that flows through the chain:
//! the request ID, request timing, and a typed extension store that stages
//! use to hand values to later stages and to the handler (decoded request
//! bodies, authenticated principals). The extension store is keyed by type,
//! one slot per distinct type, which is the Rust rendering of typed context
//! keys.

use palisade_core::RequestId;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::time::Instant;

/// Mutable context carried alongside a request through the middleware chain.
#[derive(Debug)]
pub struct MiddlewareContext {
    request_id: RequestId,
    started_at: Instant,
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new context with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestId::new(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Sets the request ID.
    ///
    /// Normally only the request-id stage calls this, after extracting a
    /// trusted incoming ID or generating a fresh one.
    pub fn set_request_id(&mut self, request_id: RequestId) {
        self.request_id = request_id;
    }

    /// Returns when the request started processing.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension value, replacing any previous value of the
    /// same type.
    ///
    /// # Example
    ///
    /// ```
    /// use palisade_middleware::MiddlewareContext;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Principal(String);
    ///
    /// let mut ctx = MiddlewareContext::new();
    /// ctx.set_extension(Principal("alice".to_string()));
    /// assert_eq!(ctx.get_extension::<Principal>().unwrap().0, "alice");
    /// ```
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value, or `None` if no value of that
    /// type was stored.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|boxed| *boxed)
    }

    /// Checks whether an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}
