//! CORS stage.
//!
//! Hardened cross-origin resource sharing: preflights are answered directly
//! with `204 No Content`, and the wildcard origin is never combined with
//! credentials.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use bytes::Bytes;
use http::{header, HeaderValue, Method, StatusCode};
use http_body_util::Full;
use palisade_core::{header as palisade_header, Request, Response};

/// Options for [`CorsMiddleware`].
#[derive(Debug, Clone)]
pub struct CorsOptions {
    /// Origins allowed to make cross-origin requests. `"*"` allows any.
    pub allowed_origins: Vec<String>,
    /// Methods advertised on preflight responses.
    pub allowed_methods: Vec<String>,
    /// Request headers advertised on preflight responses.
    pub allowed_headers: Vec<String>,
    /// Response headers exposed to cross-origin scripts.
    pub exposed_headers: Vec<String>,
    /// Whether `Access-Control-Allow-Credentials: true` is sent.
    ///
    /// Ignored (forced off) when the wildcard origin is in use.
    pub allow_credentials: bool,
    /// Preflight cache lifetime in seconds.
    pub max_age_seconds: u32,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "PUT".to_string(),
                "PATCH".to_string(),
                "DELETE".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec![
                "Accept".to_string(),
                "Authorization".to_string(),
                "Content-Type".to_string(),
                palisade_header::X_REQUEST_ID.to_string(),
            ],
            exposed_headers: vec![
                palisade_header::X_REQUEST_ID.to_string(),
                palisade_header::CONTENT_SECURITY_POLICY.to_string(),
            ],
            allow_credentials: false,
            max_age_seconds: 3600,
        }
    }
}

/// Middleware answering CORS preflights and stamping CORS headers on
/// cross-origin responses.
pub struct CorsMiddleware {
    options: CorsOptions,
    wildcard: bool,
}

impl CorsMiddleware {
    /// Creates the stage.
    ///
    /// If the wildcard origin is configured together with credentials,
    /// credentials are disabled; the two together would let any site read
    /// authenticated responses.
    #[must_use]
    pub fn new(mut options: CorsOptions) -> Self {
        let wildcard = options.allowed_origins.iter().any(|o| o == "*");
        if wildcard && options.allow_credentials {
            tracing::warn!("wildcard CORS origin with credentials is not allowed, disabling credentials");
            options.allow_credentials = false;
        }
        Self { options, wildcard }
    }

    /// Resolves the `Access-Control-Allow-Origin` value for a request
    /// origin, or `None` when the origin is not allowed.
    fn allow_origin(&self, origin: Option<&str>) -> Option<HeaderValue> {
        if self.wildcard {
            return Some(HeaderValue::from_static("*"));
        }
        let origin = origin?;
        if self.options.allowed_origins.iter().any(|o| o == origin) {
            HeaderValue::from_str(origin).ok()
        } else {
            None
        }
    }

    fn apply_headers(&self, response: &mut Response, allow_origin: HeaderValue) {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        if !self.wildcard {
            // Origin-dependent responses must not be cached across origins.
            headers.append(header::VARY, HeaderValue::from_static("origin"));
        }
        if self.options.allow_credentials {
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
        if !self.options.exposed_headers.is_empty() {
            if let Ok(value) = self.options.exposed_headers.join(", ").parse() {
                headers.insert(header::ACCESS_CONTROL_EXPOSE_HEADERS, value);
            }
        }
    }

    fn preflight_response(&self, allow_origin: HeaderValue) -> Response {
        let mut builder = http::Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                self.options.allowed_methods.join(", "),
            )
            .header(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                self.options.allowed_headers.join(", "),
            )
            .header(
                palisade_header::ACCESS_CONTROL_MAX_AGE,
                self.options.max_age_seconds.to_string(),
            );
        if self.options.allow_credentials {
            builder = builder.header(header::ACCESS_CONTROL_ALLOW_CREDENTIALS, "true");
        }
        let mut response = builder
            .body(Full::new(Bytes::new()))
            .expect("failed to build preflight response");
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
        response
    }
}

impl Default for CorsMiddleware {
    fn default() -> Self {
        Self::new(CorsOptions::default())
    }
}

impl Middleware for CorsMiddleware {
    fn name(&self) -> &'static str {
        "cors"
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let origin = request
                .headers()
                .get(header::ORIGIN)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let allow_origin = self.allow_origin(origin.as_deref());

            let preflight = request.method() == Method::OPTIONS
                && request
                    .headers()
                    .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
            if preflight {
                return match allow_origin {
                    Some(value) => self.preflight_response(value),
                    // Disallowed origins get an empty 204 with no CORS
                    // headers; the browser enforces the block.
                    None => http::Response::builder()
                        .status(StatusCode::NO_CONTENT)
                        .body(Full::new(Bytes::new()))
                        .expect("failed to build preflight response"),
                };
            }

            let mut response = next.run(ctx, request).await;
            if let Some(value) = allow_origin {
                if origin.is_some() || self.wildcard {
                    self.apply_headers(&mut response, value);
                }
            }
            response
        })
    }
}
