//! Handler and middleware traits, and type erasure.
//!
//! # How chains are stored
//!
//! Every route resolves to a *chain*: an ordered, immutable slice of
//! type-erased steps. Middleware steps receive the request plus a [`Next`]
//! cursor and decide whether to continue; the terminal handler ignores the
//! cursor and produces the response.
//!
//! ```text
//! async fn hello(req: Request) -> Response { … }        ← user writes this
//!        ↓ router.get("/", hello)
//! Arc::new(FnHandler(hello))                            ← BoxedHandler
//!        ↓ collected with the global middleware
//! Chain = Arc<[BoxedHandler]>                           ← shared, never copied
//!        ↓ Next::run at request time
//! chain[cursor].call(req, next)                         ← one vtable dispatch
//! ```
//!
//! The per-request cost of walking a chain is one `Arc` clone and one virtual
//! call per step.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::next::Next;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future that resolves to a [`Response`].
///
/// `Send + 'static` let tokio move the future across worker threads.
pub(crate) type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Internal dispatch interface shared by handlers and middleware.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return types of the public `Handler` and `Middleware` traits.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// A type-erased chain step shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// An immutable handler sequence.
///
/// Chains are compared by identity (`Arc::ptr_eq`), never by content.
pub type Chain = Arc<[BoxedHandler]>;

// ── Public traits ─────────────────────────────────────────────────────────────

/// Implemented for every valid terminal handler.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// Sealed: only the blanket impl below can satisfy it.
pub trait Handler: private::SealedHandler + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

/// Implemented for every valid middleware.
///
/// Automatically satisfied for any `async fn` with the signature:
///
/// ```text
/// async fn name(req: Request, next: Next) -> impl IntoResponse
/// ```
///
/// Call `next.run(req).await` to continue down the chain, or return early to
/// short-circuit it.
pub trait Middleware: private::SealedMiddleware + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedHandler;
}

mod private {
    pub trait SealedHandler {}
    pub trait SealedMiddleware {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::SealedHandler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<F, Fut, R> private::SealedMiddleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_middleware(self) -> BoxedHandler {
        Arc::new(FnMiddleware(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, _next: Next) -> BoxFuture {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

struct FnMiddleware<F>(F);

impl<F, Fut, R> ErasedHandler for FnMiddleware<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let fut = (self.0)(req, next);
        Box::pin(async move { fut.await.into_response() })
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// An ordered list of middleware followed by a terminal handler.
///
/// ```rust,no_run
/// # use tsu::{Handlers, Next, Request, Response};
/// # async fn auth(req: Request, next: Next) -> Response { next.run(req).await }
/// # async fn user_detail(_: Request) -> Response { Response::text("") }
/// let handlers = Handlers::new()
///     .middleware(auth)
///     .handler(user_detail);
/// ```
#[derive(Clone, Default)]
pub struct Handlers(Vec<BoxedHandler>);

impl Handlers {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.0.push(middleware.into_boxed_middleware());
        self
    }

    pub fn handler(mut self, handler: impl Handler) -> Self {
        self.0.push(handler.into_boxed_handler());
        self
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub(crate) fn into_vec(self) -> Vec<BoxedHandler> {
        self.0
    }
}
