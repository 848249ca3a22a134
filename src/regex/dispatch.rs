//! Self-contained regex dispatch.
//!
//! [`dispatch`] folds an ordered list of [`Matcher`]s into one ordinary
//! handler. Mount it on a literal catch-all route and it picks a branch by
//! method and pattern, without touching the engine's not-found path:
//!
//! ```rust,no_run
//! use tsu::{Handlers, Method, Request, Response, Router};
//! use tsu::regex::{Matcher, dispatch};
//!
//! # async fn get_settings(_: Request) -> Response { Response::text("") }
//! # async fn set_settings(_: Request) -> Response { Response::text("") }
//! # async fn user_detail(_: Request) -> Response { Response::text("") }
//! let app = Router::new().any("/users/{*rest}", dispatch([
//!     Matcher::new(Method::GET,  r"^/users/settings/$", Handlers::new().handler(get_settings)),
//!     Matcher::new(Method::POST, r"^/users/settings/$", Handlers::new().handler(set_settings)),
//!     Matcher::new(Method::GET,  r"^/users/(?P<user_id>\d+)/$", Handlers::new().handler(user_detail)),
//! ]));
//! ```

use std::sync::Arc;

use http::{Method, StatusCode};

use crate::handler::{Chain, Handler, Handlers};
use crate::next::{Next, Sequences};
use crate::regex::pattern::Pattern;
use crate::request::Request;
use crate::response::Response;

/// One branch of a [`dispatch`] handler.
pub struct Matcher {
    method: Method,
    pattern: Pattern,
    handlers: Chain,
}

impl Matcher {
    /// # Panics
    ///
    /// Panics if `pattern` is not a valid regular expression.
    pub fn new(method: Method, pattern: &str, handlers: Handlers) -> Self {
        let pattern = Pattern::new(pattern).unwrap_or_else(|e| panic!("{e}"));
        Self { method, pattern, handlers: handlers.into_vec().into() }
    }
}

/// Builds a handler that runs the first matcher whose method and pattern
/// both fit the request, or answers `404 Not Found`.
///
/// Captured parameters replace the request's parameters only when the
/// pattern captured something, so a `{*rest}` parameter from the mounting
/// route survives patterns without named groups.
pub fn dispatch(matchers: impl IntoIterator<Item = Matcher>) -> impl Handler {
    let matchers: Arc<[Matcher]> = matchers.into_iter().collect();
    let sequences = Arc::new(Sequences::empty());

    move |mut req: Request| {
        let matchers = Arc::clone(&matchers);
        let sequences = Arc::clone(&sequences);
        async move {
            let found = matchers.iter()
                .filter(|m| m.method == *req.method())
                .find_map(|m| Some((m.pattern.captures(req.path())?, Arc::clone(&m.handlers))));

            match found {
                Some((params, chain)) => {
                    if !params.is_empty() {
                        req.set_params(params);
                    }
                    Next::new(chain, sequences).run(req).await
                }
                None => Response::status(StatusCode::NOT_FOUND),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn echo(req: Request) -> String {
        format!("{} {}", req.method(), req.path())
    }

    async fn show_params(req: Request) -> String {
        req.params().iter()
            .map(|p| format!("{}:{}", p.key, p.value))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn users() -> Chain {
        let handler = dispatch([
            Matcher::new(Method::GET, r"^/users/settings/$", Handlers::new().handler(echo)),
            Matcher::new(Method::POST, r"^/users/settings/$", Handlers::new().handler(echo)),
            Matcher::new(Method::GET, r"^/users/(?P<user_id>\d+)/$", Handlers::new().handler(show_params)),
            Matcher::new(Method::GET, r"^/users/(?P<shadowed>\d+)/$", Handlers::new().handler(echo)),
        ]);
        Arc::from(vec![handler.into_boxed_handler()])
    }

    async fn call(chain: &Chain, method: Method, path: &str) -> Response {
        Next::new(Arc::clone(chain), Arc::new(Sequences::empty()))
            .run(Request::new(method, path))
            .await
    }

    #[tokio::test]
    async fn picks_branch_by_method_and_pattern() {
        let chain = users();

        let res = call(&chain, Method::GET, "/users/settings/").await;
        assert_eq!(res.body(), b"GET /users/settings/");

        let res = call(&chain, Method::POST, "/users/settings/").await;
        assert_eq!(res.body(), b"POST /users/settings/");
    }

    #[tokio::test]
    async fn first_matching_branch_wins() {
        let res = call(&users(), Method::GET, "/users/12345/").await;
        assert_eq!(res.body(), b"user_id:12345");
    }

    #[tokio::test]
    async fn no_branch_answers_not_found() {
        let chain = users();

        let res = call(&chain, Method::DELETE, "/users/settings/").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

        let res = call(&chain, Method::GET, "/users/alice/").await;
        assert_eq!(res.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    #[should_panic(expected = "invalid regex route")]
    fn invalid_pattern_panics() {
        let _ = Matcher::new(Method::GET, "(", Handlers::new().handler(echo));
    }
}
