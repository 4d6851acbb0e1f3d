//! Ordered composition of middleware stages.
//!
//! Unlike a framework with a fixed stage order, this collection leaves
//! ordering to the caller: stages run in the order they were added, with
//! the first added stage outermost.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use palisade_core::{Request, Response};

/// An ordered stack of middleware stages in front of a handler.
///
/// # Example
///
/// ```
/// use palisade_middleware::{Pipeline, stages::{RecoveryMiddleware, RequestIdMiddleware}};
///
/// let pipeline = Pipeline::new()
///     .with(RecoveryMiddleware::new())
///     .with(RequestIdMiddleware::new());
/// assert_eq!(pipeline.stage_count(), 2);
/// ```
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn Middleware>>,
}

impl Pipeline {
    /// Creates an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage; earlier stages wrap later ones.
    #[must_use]
    pub fn with<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Box::new(middleware));
        self
    }

    /// Returns the stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs `request` through all stages and into `handler`.
    pub async fn run<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send,
    {
        let mut next = Next::handler(handler);
        for stage in self.stages.iter().rev() {
            next = Next::stage(stage.as_ref(), next);
        }
        next.run(ctx, request).await
    }
}
