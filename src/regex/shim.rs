//! Routing-miss interception.
//!
//! Installing a [`RegexRouter`] puts one extra step at slot 0 of two engine
//! sequences: the global middleware (which prefixes every literal route) and
//! the resolved not-found sequence. The step runs for every request and
//! decides by identity whether it is looking at a routing miss:
//!
//! ```text
//! literal hit   [intercept, global…, route handler]      → pass through
//! literal miss  [intercept, global…, not-found…]         → dispatch regex table
//!     match     [intercept, global…, shared…, route…]    ← substituted chain
//! ```
//!
//! The cursor is left alone across the substitution. Both the old and the
//! new chain hold the step at slot 0, so the next step to run is the first
//! global middleware either way.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler};
use crate::next::Next;
use crate::regex::RegexRouter;
use crate::request::Request;
use crate::response::Response;

/// The engine capabilities a regex router is installed through.
///
/// [`Router`](crate::Router) implements it. An engine without these
/// capabilities cannot accept a [`RegexRouter`]: the mismatch is a compile
/// error, never a request-time surprise.
pub trait Host {
    /// The regex router already installed on this engine, if any.
    fn regex_router(&self) -> Option<Arc<RegexRouter>>;

    /// Puts `step` first in the global middleware and in the resolved
    /// not-found sequence (creating that sequence if the engine has none),
    /// and records `owner` as this engine's regex router.
    fn install_fallback(&mut self, step: BoxedHandler, owner: Arc<RegexRouter>);
}

impl RegexRouter {
    /// Installs this router on `engine` and returns it.
    ///
    /// One regex router per engine: if `engine` already has one, that one is
    /// returned and `self` is dropped.
    pub fn install<H: Host>(self, engine: &mut H) -> Arc<RegexRouter> {
        if let Some(existing) = engine.regex_router() {
            warn!(dropped_routes = self.len(), "engine already has a regex router, keeping it");
            return existing;
        }
        let router = Arc::new(self);
        let step: BoxedHandler = Arc::new(Intercept { router: Arc::clone(&router) });
        engine.install_fallback(step, Arc::clone(&router));
        debug!(routes = router.len(), "regex router installed");
        router
    }
}

struct Intercept {
    router: Arc<RegexRouter>,
}

impl ErasedHandler for Intercept {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        if !next.is_route_miss() {
            return Box::pin(next.run(req));
        }
        Box::pin(intercept(Arc::clone(&self.router), req, next))
    }
}

async fn intercept(router: Arc<RegexRouter>, mut req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let Some(matched) = router.find(&method, req.path()) else {
        return next.run(req).await;
    };

    let chain = Arc::clone(matched.entry().compose(next.global_middleware(), &router.middleware));
    let pattern = matched.pattern();
    debug!(%method, path = req.path(), pattern, "regex route matched");

    let params = matched.into_params();
    if let Some(hook) = &router.hook {
        hook(&mut req, &params, &method, pattern);
    }
    req.set_params(params);

    next.substitute(chain).run(req).await
}
