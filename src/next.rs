//! The chain cursor.
//!
//! A [`Next`] is the in-flight state of one request: the chain being executed,
//! the index of the step to run next, and a handle to the engine's two
//! well-known sequences. Middleware advances it with [`Next::run`].
//!
//! Fallback routers use the rest of this type as their whole view of the
//! engine: [`Next::is_route_miss`], [`Next::global_middleware`] and
//! [`Next::substitute`].

use std::sync::Arc;

use http::StatusCode;

use crate::handler::Chain;
use crate::request::Request;
use crate::response::Response;

/// The engine sequences a request may be compared against.
pub(crate) struct Sequences {
    pub(crate) global: Chain,
    pub(crate) not_found: Chain,
}

impl Sequences {
    pub(crate) fn empty() -> Self {
        Self { global: Arc::from([]), not_found: Arc::from([]) }
    }
}

/// Cursor into the chain of the current request.
pub struct Next {
    chain: Chain,
    cursor: usize,
    sequences: Arc<Sequences>,
}

impl Next {
    pub(crate) fn new(chain: Chain, sequences: Arc<Sequences>) -> Self {
        Self { chain, cursor: 0, sequences }
    }

    /// Runs the remaining chain.
    ///
    /// A chain that runs out without producing a response answers
    /// `404 Not Found`.
    pub async fn run(mut self, req: Request) -> Response {
        let Some(step) = self.chain.get(self.cursor).cloned() else {
            return Response::status(StatusCode::NOT_FOUND);
        };
        self.cursor += 1;
        step.call(req, self).await
    }

    /// Whether this request fell through the literal router into the engine's
    /// not-found sequence.
    ///
    /// Compared by identity. An empty chain counts as a miss.
    pub fn is_route_miss(&self) -> bool {
        self.chain.is_empty() || Arc::ptr_eq(&self.chain, &self.sequences.not_found)
    }

    /// The engine's global middleware, in registration order.
    pub fn global_middleware(&self) -> &Chain {
        &self.sequences.global
    }

    /// Replaces the in-flight chain, keeping the cursor where it is.
    pub fn substitute(self, chain: Chain) -> Self {
        Self { chain, ..self }
    }

    pub fn chain(&self) -> &Chain { &self.chain }
    pub fn cursor(&self) -> usize { self.cursor }
}
