//! Built-in middleware.
//!
//! Middleware intercepts requests and responses and is the right place for
//! cross-cutting concerns: structured tracing, metrics, request-id injection,
//! and authentication-header inspection.
//!
//! Anything with the shape `async fn(Request, Next) -> impl IntoResponse` is
//! middleware. Register it globally with
//! [`Router::middleware`](crate::Router::middleware), for every regex route
//! with [`RegexRouter::middleware`](crate::regex::RegexRouter::middleware), or
//! per route through [`Handlers`](crate::Handlers).

mod trace;

pub use trace::trace;
