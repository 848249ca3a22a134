//! # tsu
//!
//! A minimal HTTP framework for Rust services behind a reverse proxy, with a
//! regular-expression router for the routes a radix tree cannot express.
//!
//! ## Two routers, one request path
//!
//! - [`Router`]: radix-tree routing via [`matchit`]. `{name}` segments,
//!   `{*rest}` catch-alls, O(path-length) lookup. Tried first, always.
//! - [`regex::RegexRouter`]: ordered regular expressions per method, named
//!   groups as parameters. Consulted only when the tree finds nothing, right
//!   before the engine would answer `404`.
//!
//! Both fill the same [`Params`], so handlers read `req.param("id")` without
//! caring which router matched.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use tsu::{Method, Request, Response, Router, Server, middleware};
//! use tsu::regex::RegexRouter;
//!
//! #[tokio::main]
//! async fn main() {
//!     let regex = RegexRouter::new()
//!         .get(r"^/users/(?P<user_id>\d+)/$", user_detail)
//!         .any(r"^/users/settings/$", echo);
//!
//!     let app = Router::new()
//!         .middleware(middleware::trace)
//!         .on(Method::GET, "/ping", ping)
//!         .fallback(regex);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn ping(_req: Request) -> &'static str {
//!     "pong"
//! }
//!
//! async fn user_detail(req: Request) -> Response {
//!     let id = req.param("user_id").unwrap_or("unknown");
//!     Response::json(format!(r#"{{"id":"{id}"}}"#).into_bytes())
//! }
//!
//! async fn echo(req: Request) -> String {
//!     format!("{} {}", req.method(), req.path())
//! }
//! ```

mod error;
mod handler;
mod method;
mod next;
mod params;
mod request;
mod response;
mod router;
mod server;

pub mod middleware;
pub mod regex;

pub use error::{Error, RouteError};
pub use handler::{Chain, Handler, Handlers, Middleware};
#[doc(hidden)]
pub use handler::{BoxedHandler, ErasedHandler};
pub use http::StatusCode;
pub use method::Method;
pub use next::Next;
pub use params::{Param, Params};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::{Engine, Router};
pub use server::{DEFAULT_BODY_LIMIT, Server};
