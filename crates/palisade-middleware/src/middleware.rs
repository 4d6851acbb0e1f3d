//! The middleware trait and chain plumbing.
//!
//! A middleware receives the mutable per-request [`MiddlewareContext`], the
//! request, and a [`Next`] callback that invokes the rest of the chain. Not
//! calling `next` short-circuits the pipeline with the middleware's own
//! response (how CORS preflights, failed validation, and rejected
//! authorization are answered).

use crate::context::MiddlewareContext;
use palisade_core::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future returning a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One composable middleware stage.
///
/// # Invariants
///
/// - a stage calls `next.run()` at most once; skipping it short-circuits
/// - a stage must not swallow a response produced downstream
///
/// # Example
///
/// ```
/// use palisade_middleware::{BoxFuture, Middleware, MiddlewareContext, Next};
/// use palisade_core::{Request, Response};
///
/// struct ServerHeader;
///
/// impl Middleware for ServerHeader {
///     fn name(&self) -> &'static str {
///         "server_header"
///     }
///
///     fn process<'a>(
///         &'a self,
///         ctx: &'a mut MiddlewareContext,
///         request: Request,
///         next: Next<'a>,
///     ) -> BoxFuture<'a, Response> {
///         Box::pin(async move {
///             let mut response = next.run(ctx, request).await;
///             response
///                 .headers_mut()
///                 .insert("server", "palisade".parse().unwrap());
///             response
///         })
///     }
/// }
/// ```
pub trait Middleware: Send + Sync + 'static {
    /// The stage's name, used in logs and pipeline introspection.
    fn name(&self) -> &'static str;

    /// Processes the request, delegating to `next` for the rest of the
    /// chain.
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Callback invoking the remainder of the chain.
///
/// Consumed by [`Next::run`], so a stage can only continue the chain once.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Stage {
        middleware: &'a dyn Middleware,
        rest: Box<Next<'a>>,
    },
    Handler(Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>),
}

impl<'a> Next<'a> {
    /// Creates a `Next` that runs `middleware` before the rest of the chain.
    pub(crate) fn stage(middleware: &'a dyn Middleware, rest: Next<'a>) -> Self {
        Self {
            inner: NextInner::Stage {
                middleware,
                rest: Box::new(rest),
            },
        }
    }

    /// Creates the terminal `Next` that invokes the handler.
    pub fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next stage or the handler.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Stage { middleware, rest } => middleware.process(ctx, request, *rest).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

/// A middleware built from a function, for one-off stages that don't
/// warrant a named type.
///
/// The function receives the same arguments as [`Middleware::process`] and
/// returns a [`BoxFuture`] tied to the borrow of the context.
///
/// # Example
///
/// ```
/// use palisade_middleware::{BoxFuture, FnMiddleware, MiddlewareContext, Next};
/// use palisade_core::{Request, Response};
///
/// fn timing<'a>(
///     ctx: &'a mut MiddlewareContext,
///     request: Request,
///     next: Next<'a>,
/// ) -> BoxFuture<'a, Response> {
///     Box::pin(async move {
///         let response = next.run(ctx, request).await;
///         tracing::debug!(elapsed = ?ctx.elapsed(), "request finished");
///         response
///     })
/// }
///
/// let stage = FnMiddleware::new("timing", timing);
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut MiddlewareContext, Request, Next<'a>) -> BoxFuture<'a, Response>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        (self.func)(ctx, request, next)
    }
}
