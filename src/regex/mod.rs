//! Regular-expression routing on top of the literal router.
//!
//! The radix tree in [`Router`](crate::Router) cannot express overlapping
//! alternatives or constrained captures like `(?P<id>\d+)`. A [`RegexRouter`]
//! covers those routes. It stays out of the way of the literal router: it is
//! consulted only for requests the tree did not match, right before the engine
//! would answer `404`.
//!
//! ```rust,no_run
//! use tsu::{Method, Request, Response, Router};
//! use tsu::regex::RegexRouter;
//!
//! async fn user_detail(req: Request) -> Response {
//!     Response::text(req.param("user_id").unwrap_or_default().to_owned())
//! }
//!
//! let regex = RegexRouter::new()
//!     .get(r"^/users/(?P<user_id>\d+)/$", user_detail)
//!     .hook(|_req, params, method, pattern| {
//!         tracing::info!(%method, pattern, params = params.len(), "regex route");
//!     });
//!
//! let app = Router::new()
//!     .get("/ping", |_req: Request| async { "pong" })
//!     .fallback(regex);
//! ```
//!
//! Routes are tried in registration order per method and the first match
//! wins. Named groups become request parameters, readable with
//! [`Request::param`](crate::Request::param) exactly like `{name}` segments.
//!
//! Call sites that should not touch the engine's not-found path can use the
//! self-contained [`dispatch`] handler instead.

mod dispatch;
mod pattern;
mod shim;
mod table;

use std::sync::Arc;

use http::Method;

use crate::error::RouteError;
use crate::handler::{BoxedHandler, Handler, Handlers, Middleware};
use crate::method::ANY;
use crate::params::Params;
use crate::request::Request;

pub use dispatch::{Matcher, dispatch};
pub use pattern::Pattern;
pub use shim::Host;
pub use table::Match;

use table::MethodTable;

/// Observer invoked on every successful regex dispatch with the request, the
/// captured parameters, the method and the matched pattern source.
///
/// Runs before the parameters are installed on the request and before any
/// route middleware. It may mutate the request (headers, extensions).
pub type Hook = Arc<dyn Fn(&mut Request, &Params, &Method, &str) + Send + Sync + 'static>;

/// A table of regex routes, grouped by method.
///
/// Built once at startup, then handed to an engine with
/// [`Router::fallback`](crate::Router::fallback) or [`RegexRouter::install`].
/// Registration calls consume and return `self` so they chain naturally.
///
/// # Panics
///
/// Registration panics on configuration errors: an invalid pattern, a pattern
/// already registered under the same method, or an empty handler list. Use
/// [`try_handle`](RegexRouter::try_handle) to get the [`RouteError`] instead.
#[derive(Default)]
pub struct RegexRouter {
    middleware: Vec<BoxedHandler>,
    table: MethodTable,
    hook: Option<Hook>,
}

impl RegexRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the observer called on every successful dispatch.
    pub fn hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Request, &Params, &Method, &str) + Send + Sync + 'static,
    {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Adds middleware shared by every route of this router.
    ///
    /// It runs after the engine's global middleware and before the route's
    /// own handlers.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(middleware.into_boxed_middleware());
        self
    }

    /// Registers `handlers` for `method` requests whose path matches
    /// `pattern`.
    ///
    /// Patterns not starting with `^` are anchored automatically. Custom
    /// methods (`Method::from_bytes(b"PURGE")`) are accepted.
    pub fn handle(self, method: Method, pattern: &str, handlers: Handlers) -> Self {
        self.try_handle(method, pattern, handlers)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible form of [`handle`](RegexRouter::handle).
    pub fn try_handle(
        mut self,
        method: Method,
        pattern: &str,
        handlers: Handlers,
    ) -> Result<Self, RouteError> {
        self.table.register(method, pattern, handlers.into_vec())?;
        Ok(self)
    }

    /// Registers a single handler. Returns `self` for chaining.
    pub fn on(self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.handle(method, pattern, Handlers::new().handler(handler))
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, pattern, handler)
    }

    pub fn put(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, pattern, handler)
    }

    pub fn head(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::HEAD, pattern, handler)
    }

    pub fn options(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::OPTIONS, pattern, handler)
    }

    pub fn connect(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::CONNECT, pattern, handler)
    }

    pub fn trace(self, pattern: &str, handler: impl Handler) -> Self {
        self.on(Method::TRACE, pattern, handler)
    }

    /// Registers `handler` under GET, POST, PUT, PATCH, HEAD, OPTIONS, DELETE,
    /// CONNECT and TRACE.
    pub fn any(mut self, pattern: &str, handler: impl Handler) -> Self {
        let handlers = Handlers::new().handler(handler);
        for method in ANY {
            self = self.handle(method, pattern, handlers.clone());
        }
        self
    }

    /// Resolves `method` and `path` against the table. First match wins.
    pub fn find(&self, method: &Method, path: &str) -> Option<Match<'_>> {
        self.table.dispatch(method, path)
    }

    /// Number of registered routes, across all methods.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn endpoint(_req: Request) -> &'static str {
        "ok"
    }

    #[test]
    fn any_registers_the_fixed_method_set() {
        let router = RegexRouter::new().any(r"^/any/$", endpoint);

        assert_eq!(router.len(), 9);
        for method in ANY {
            assert!(router.find(&method, "/any/").is_some(), "{method}");
        }
        assert!(router.find(&Method::from_bytes(b"PURGE").unwrap(), "/any/").is_none());
    }

    #[test]
    #[should_panic(expected = "register duplicate regex route: GET ^/a$")]
    fn duplicate_registration_panics() {
        let _ = RegexRouter::new().get("^/a$", endpoint).get("^/a$", endpoint);
    }

    #[test]
    #[should_panic(expected = "invalid regex route `^/(`")]
    fn invalid_pattern_panics() {
        let _ = RegexRouter::new().get("^/(", endpoint);
    }

    #[test]
    fn try_handle_reports_configuration_errors() {
        let result = RegexRouter::new()
            .get("^/a$", endpoint)
            .try_handle(Method::GET, "^/a$", Handlers::new().handler(endpoint));
        assert!(matches!(result, Err(RouteError::Duplicate { .. })));

        let result = RegexRouter::new().try_handle(Method::GET, "^/b$", Handlers::new());
        assert!(matches!(result, Err(RouteError::NoHandlers { .. })));
    }

    #[test]
    fn find_reports_pattern_and_params() {
        let router = RegexRouter::new().get(r"^/users/(?P<user_id>\d+)/$", endpoint);

        let matched = router.find(&Method::GET, "/users/12345/").unwrap();
        assert_eq!(matched.pattern(), r"^/users/(?P<user_id>\d+)/$");
        assert_eq!(matched.params().get("user_id"), Some("12345"));
        assert!(router.find(&Method::GET, "/other/users/12345/").is_none());
    }
}
