//! Literal routes, a regex dispatch handler and a regex fallback router on one
//! engine.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl http://localhost:8080/ping
//!   curl http://localhost:8080/user/alice
//!   curl http://localhost:8080/users/settings/
//!   curl -X POST http://localhost:8080/users/settings/
//!   curl http://localhost:8080/users/12345/
//!   curl http://localhost:8080/anything/else

use tracing_subscriber::EnvFilter;
use tsu::regex::{Matcher, RegexRouter, dispatch};
use tsu::{Handlers, Method, Request, Response, Router, Server, middleware};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Requests the literal tree cannot place land here. `^/.*$` catches all
    // of them, so this engine never answers 404 for a GET.
    let regex = RegexRouter::new()
        .hook(|req, params, method, pattern| {
            tracing::debug!(%method, path = req.path(), pattern, params = params.len(), "regex hook");
        })
        .get(r"^/.*$", echo_url);

    let app = Router::new()
        .middleware(middleware::trace)
        .get("/ping", ping)
        .get("/user/{name}", user)
        .any("/users/{*any}", dispatch([
            Matcher::new(Method::GET,  r"^/users/settings/$", Handlers::new().handler(echo)),
            Matcher::new(Method::POST, r"^/users/settings/$", Handlers::new().handler(echo)),
            Matcher::new(Method::GET,  r"^/users/(?P<user_id>\d+)/$", Handlers::new().handler(params)),
        ]))
        .fallback(regex);

    Server::bind("0.0.0.0:8080")
        .serve(app)
        .await
        .expect("server error");
}

async fn ping(_req: Request) -> &'static str {
    "pong"
}

// GET /user/{name}
async fn user(req: Request) -> Response {
    let name = req.param("name").unwrap_or_default();
    Response::json(format!(r#"{{"user":"{name}","status":"no value"}}"#).into_bytes())
}

// "GET /users/settings/"
async fn echo(req: Request) -> String {
    format!("{} {}", req.method(), req.path())
}

// "user_id:12345"
async fn params(req: Request) -> String {
    req.params()
        .iter()
        .map(|p| format!("{}:{}", p.key, p.value))
        .collect::<Vec<_>>()
        .join(" ")
}

async fn echo_url(req: Request) -> String {
    req.path().to_owned()
}
