//! Authorization stage.
//!
//! A request is admitted when any configured [`AuthorizationFn`] accepts
//! it, so routes can allow several credential schemes at once (a service
//! account via basic auth plus end users via bearer tokens).

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use base64::Engine;
use palisade_core::{PalisadeError, Request, Response, ResponseExt};
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// A predicate deciding whether a request carries acceptable credentials.
pub type AuthorizationFn = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

/// Builds a predicate accepting `Authorization: Basic` credentials for one
/// user.
///
/// The expected username and password are stored and compared as SHA-256
/// digests so the comparison cost does not depend on how much of the
/// credential matches.
#[must_use]
pub fn allow_basic_auth_user(username: &str, password: &str) -> AuthorizationFn {
    let expected_user = digest(username);
    let expected_password = digest(password);

    Arc::new(move |request: &Request| {
        let Some(value) = request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };
        let Some(encoded) = value.strip_prefix("Basic ") else {
            return false;
        };
        let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded) else {
            return false;
        };
        let Ok(decoded) = String::from_utf8(decoded) else {
            return false;
        };
        let Some((user, password)) = decoded.split_once(':') else {
            return false;
        };

        let user_ok = digest(user) == expected_user;
        let password_ok = digest(password) == expected_password;
        user_ok && password_ok
    })
}

/// Builds a predicate accepting `Authorization: Bearer` tokens that pass
/// `validate`.
///
/// Token validation is pluggable; pass a closure that checks the token
/// against a static secret, a key set, or a verifier.
#[must_use]
pub fn allow_bearer_token<V>(validate: V) -> AuthorizationFn
where
    V: Fn(&str) -> bool + Send + Sync + 'static,
{
    Arc::new(move |request: &Request| {
        request
            .headers()
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| !token.is_empty() && validate(token))
    })
}

/// Middleware rejecting requests that no predicate admits.
pub struct RequireAuthorizationMiddleware {
    predicates: Vec<AuthorizationFn>,
}

impl RequireAuthorizationMiddleware {
    /// Creates the stage admitting requests that pass any of `predicates`.
    ///
    /// An empty predicate list rejects everything.
    #[must_use]
    pub fn any_of(predicates: Vec<AuthorizationFn>) -> Self {
        Self { predicates }
    }
}

impl Middleware for RequireAuthorizationMiddleware {
    fn name(&self) -> &'static str {
        "require_authorization"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let admitted = self.predicates.iter().any(|predicate| predicate(&request));
            if !admitted {
                let request_id = ctx.request_id().to_string();
                tracing::debug!(
                    path = request.uri().path(),
                    request_id,
                    "rejecting request with no acceptable credentials"
                );
                let error = PalisadeError::authentication("missing or invalid credentials");
                return Response::from_palisade_error(&error, Some(&request_id));
            }
            next.run(ctx, request).await
        })
    }
}
