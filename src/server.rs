//! Serving a built [`Engine`] over TCP.
//!
//! [`Server::serve`] accepts until the process is asked to stop (SIGTERM or
//! Ctrl-C), then stops accepting and waits for every open connection to
//! finish its in-flight requests. Under Kubernetes that fits inside
//! `terminationGracePeriodSeconds` as long as handlers finish in time.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Body;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::{Engine, Router};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Request bodies larger than this are answered with `413` unless
/// [`Server::body_limit`] says otherwise.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// The HTTP server.
///
/// ```rust,no_run
/// # use tsu::{Router, Server};
/// # async fn run(app: Router) -> Result<(), tsu::Error> {
/// Server::bind("0.0.0.0:3000")
///     .body_limit(64 * 1024)
///     .serve(app)
///     .await
/// # }
/// ```
pub struct Server {
    addr: String,
    body_limit: usize,
}

impl Server {
    /// A server for `addr` (`host:port`). Nothing is bound until
    /// [`serve`](Server::serve).
    pub fn bind(addr: impl Into<String>) -> Self {
        Self { addr: addr.into(), body_limit: DEFAULT_BODY_LIMIT }
    }

    /// Largest request body accepted, in bytes.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    /// Builds `router` and serves it until shutdown.
    ///
    /// Fails only on an unparsable address or when the port cannot be bound.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        let addr: SocketAddr = self.addr.parse().map_err(|_| Error::Addr(self.addr.clone()))?;
        let listener = TcpListener::bind(addr).await?;
        let engine = Arc::new(router.build());

        info!(%addr, body_limit = self.body_limit, "tsu listening");
        let connections = accept_until_shutdown(&listener, &engine, self.body_limit).await;

        info!(in_flight = connections.len(), "shutdown signal received, draining connections");
        drain(connections).await;
        info!("tsu stopped");
        Ok(())
    }
}

async fn accept_until_shutdown(
    listener: &TcpListener,
    engine: &Arc<Engine>,
    body_limit: usize,
) -> JoinSet<()> {
    let mut connections = JoinSet::new();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            // Shutdown wins over queued connections.
            biased;

            () = &mut shutdown => return connections,

            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    connections.spawn(connection(stream, peer, Arc::clone(engine), body_limit));
                }
                Err(e) => error!("accept error: {e}"),
            },

            // Reap finished connections on long-running servers.
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
}

async fn drain(mut connections: JoinSet<()>) {
    while let Some(joined) = connections.join_next().await {
        if let Err(e) = joined {
            warn!("connection task failed: {e}");
        }
    }
}

/// Serves every request of one connection, over whichever of HTTP/1.1 or
/// HTTP/2 the client speaks.
async fn connection(stream: TcpStream, peer: SocketAddr, engine: Arc<Engine>, body_limit: usize) {
    let svc = service_fn(move |req: hyper::Request<hyper::body::Incoming>| {
        let engine = Arc::clone(&engine);
        async move { Ok::<_, Infallible>(respond(&engine, req, body_limit).await) }
    });

    if let Err(e) = ConnBuilder::new(TokioExecutor::new())
        .serve_connection(TokioIo::new(stream), svc)
        .await
    {
        error!(%peer, "connection error: {e}");
    }
}

async fn respond<B>(engine: &Engine, req: http::Request<B>, body_limit: usize) -> http::Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let response = match read_request(req, body_limit).await {
        Ok(req) => engine.handle(req).await,
        Err(status) => Response::status(status),
    };
    response.into_inner()
}

/// Buffers the body, at most `limit` bytes of it.
///
/// An oversized body is `413 Payload Too Large`, any other read failure
/// `400 Bad Request`.
async fn read_request<B>(req: http::Request<B>, limit: usize) -> Result<Request, StatusCode>
where
    B: Body,
    B::Error: Into<BoxError>,
{
    let (parts, body) = req.into_parts();
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(Request::from_parts(parts, collected.to_bytes())),
        Err(e) if e.is::<LengthLimitError>() => {
            debug!(limit, "request body over limit");
            Err(StatusCode::PAYLOAD_TOO_LARGE)
        }
        Err(e) => {
            debug!("failed to read request body: {e}");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Resolves on SIGTERM or SIGINT on Unix, Ctrl-C elsewhere.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
