//! Per-request tracing.

use std::time::Instant;

use tracing::{Instrument, info, info_span};

use crate::next::Next;
use crate::request::Request;
use crate::response::Response;

/// Wraps the rest of the chain in a `request` span carrying method and path,
/// and logs status and latency once the response is ready.
///
/// ```rust,no_run
/// use tsu::{Router, middleware};
///
/// let app = Router::new().middleware(middleware::trace);
/// ```
pub async fn trace(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.path().to_owned();
    let span = info_span!("request", %method, %path);
    let start = Instant::now();

    let res = next.run(req).instrument(span.clone()).await;

    span.in_scope(|| {
        info!(
            status = res.status_code().as_u16(),
            latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "request completed"
        );
    });
    res
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use crate::request::Request;
    use crate::router::Router;

    async fn teapot(_req: Request) -> StatusCode {
        StatusCode::IM_A_TEAPOT
    }

    #[tokio::test]
    async fn passes_the_response_through() {
        let engine = Router::new().middleware(super::trace).get("/tea", teapot).build();

        let res = engine.handle(Request::new(Method::GET, "/tea")).await;
        assert_eq!(res.status_code(), StatusCode::IM_A_TEAPOT);

        let res = engine.handle(Request::new(Method::GET, "/coffee")).await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }
}
