//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. A [`Router`] is the setup
//! half: register routes, middleware and the not-found handler, then
//! [`build`](Router::build) it into an [`Engine`], the immutable half that
//! serves requests.
//!
//! # Sequences
//!
//! Every literal route runs `global middleware… → route handlers…`. A request
//! the tree cannot resolve runs the *resolved not-found sequence* instead:
//! `global middleware… → not-found handler`. That sequence is rebuilt
//! whenever middleware or the not-found handler changes, and it is the one
//! place a [`RegexRouter`] hooks into.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Chain, Handler, Handlers, Middleware};
use crate::method::{ANY, Method};
use crate::next::{Next, Sequences};
use crate::params::Params;
use crate::regex::{Host, RegexRouter};
use crate::request::Request;
use crate::response::Response;

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or freeze it with [`Router::build`]. Each registration call returns `self`
/// so registrations chain naturally.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<usize>>,
    handlers: Vec<Vec<BoxedHandler>>,
    middleware: Vec<BoxedHandler>,
    not_found_handlers: Vec<BoxedHandler>,
    not_found: Option<Vec<BoxedHandler>>,
    regex: Option<Arc<RegexRouter>>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            handlers: Vec::new(),
            middleware: Vec::new(),
            not_found_handlers: Vec::new(),
            not_found: None,
            regex: None,
        }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax, catch-alls `{*name}`.
    /// `req.param("name")` retrieves them:
    ///
    /// ```rust,no_run
    /// # use tsu::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn create_user(_: Request) -> Response { Response::text("") }
    /// # async fn delete_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::DELETE, "/users/{id}", delete_user)
    ///     .on(Method::GET,    "/users/{id}", get_user)
    ///     .on(Method::POST,   "/users",      create_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `path` is malformed or conflicts with a registered route.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.route(method, path, Handlers::new().handler(handler))
    }

    /// Register route-specific middleware followed by a handler.
    pub fn route(mut self, method: Method, path: &str, handlers: Handlers) -> Self {
        let id = self.handlers.len();
        self.routes
            .entry(method)
            .or_default()
            .insert(path, id)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self.handlers.push(handlers.into_vec());
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::POST, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::DELETE, path, handler)
    }

    /// Register `handler` under GET, POST, PUT, PATCH, HEAD, OPTIONS, DELETE,
    /// CONNECT and TRACE.
    pub fn any(mut self, path: &str, handler: impl Handler) -> Self {
        let handlers = Handlers::new().handler(handler);
        for method in ANY {
            self = self.route(method, path, handlers.clone());
        }
        self
    }

    /// Append global middleware. It runs for every request, routed or not,
    /// in registration order.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(middleware.into_boxed_middleware());
        self.rebuild_not_found();
        self
    }

    /// Replace the handler for requests no route matches. Defaults to an
    /// empty `404 Not Found`.
    pub fn not_found(mut self, handler: impl Handler) -> Self {
        self.not_found_handlers = vec![handler.into_boxed_handler()];
        self.rebuild_not_found();
        self
    }

    /// Install a regex router on the not-found path.
    ///
    /// A second call keeps the first regex router; see
    /// [`RegexRouter::install`].
    pub fn fallback(mut self, regex: RegexRouter) -> Self {
        regex.install(&mut self);
        self
    }

    fn rebuild_not_found(&mut self) {
        self.not_found = Some(
            self.middleware.iter()
                .chain(&self.not_found_handlers)
                .cloned()
                .collect(),
        );
    }

    /// Freeze the router into a serving [`Engine`].
    pub fn build(self) -> Engine {
        let chains: Vec<Chain> = self.handlers.into_iter()
            .map(|route| self.middleware.iter().cloned().chain(route).collect())
            .collect();
        let sequences = Sequences {
            global: self.middleware.into(),
            not_found: self.not_found.unwrap_or_default().into(),
        };
        Engine {
            routes: self.routes,
            chains,
            sequences: Arc::new(sequences),
        }
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Host for Router {
    fn regex_router(&self) -> Option<Arc<RegexRouter>> {
        self.regex.clone()
    }

    fn install_fallback(&mut self, step: BoxedHandler, owner: Arc<RegexRouter>) {
        self.middleware.insert(0, Arc::clone(&step));
        self.not_found.get_or_insert_with(Vec::new).insert(0, step);
        self.regex = Some(owner);
    }
}

/// A built router, ready to serve.
///
/// Immutable and shared across connection tasks behind an `Arc`.
pub struct Engine {
    routes: HashMap<Method, MatchitRouter<usize>>,
    chains: Vec<Chain>,
    sequences: Arc<Sequences>,
}

impl Engine {
    /// Route one request and run its chain to a response.
    pub async fn handle(&self, mut req: Request) -> Response {
        let chain = match self.lookup(req.method(), req.path()) {
            Some((chain, params)) => {
                req.params = params;
                chain
            }
            None => Arc::clone(&self.sequences.not_found),
        };
        Next::new(chain, Arc::clone(&self.sequences)).run(req).await
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(Chain, Params)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let chain = Arc::clone(&self.chains[*matched.value]);
        let params = matched.params.iter().collect();
        Some((chain, params))
    }
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;

    async fn user(req: Request) -> String {
        format!("user {}", req.param("id").unwrap_or("?"))
    }

    #[tokio::test]
    async fn literal_routes_extract_params() {
        let engine = Router::new().get("/users/{id}", user).build();

        let res = engine.handle(Request::new(Method::GET, "/users/42")).await;
        assert_eq!(res.body(), b"user 42");
    }

    #[tokio::test]
    async fn unmatched_requests_answer_not_found() {
        let engine = Router::new().get("/users/{id}", user).build();

        let res = engine.handle(Request::new(Method::POST, "/users/42")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = engine.handle(Request::new(Method::GET, "/nope")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[derive(Clone)]
    struct Seen;

    async fn mark(mut req: Request, next: Next) -> Response {
        req.extensions_mut().insert(Seen);
        next.run(req).await
    }

    async fn gone(req: Request) -> Response {
        let seen = req.extensions().get::<Seen>().is_some();
        Response::builder()
            .status(StatusCode::NOT_FOUND)
            .text(format!("gone, middleware ran: {seen}"))
    }

    #[tokio::test]
    async fn not_found_runs_after_global_middleware_in_any_order() {
        let before = Router::new().not_found(gone).middleware(mark).build();
        let after = Router::new().middleware(mark).not_found(gone).build();

        for engine in [before, after] {
            let res = engine.handle(Request::new(Method::GET, "/nope")).await;
            assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
            assert_eq!(res.body(), b"gone, middleware ran: true");
        }
    }

    #[test]
    #[should_panic(expected = "invalid route `/users/{id}`")]
    fn conflicting_literal_routes_panic() {
        let _ = Router::new()
            .get("/users/{name}", user)
            .get("/users/{id}", user);
    }

    #[test]
    fn installing_twice_keeps_the_first_regex_router() {
        let mut router = Router::new();
        let first = RegexRouter::new().get("^/a$", user).install(&mut router);
        let second = RegexRouter::new().get("^/b$", user).install(&mut router);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(router.middleware.len(), 1);
        assert_eq!(router.not_found.as_ref().map(Vec::len), Some(1));
    }
}
