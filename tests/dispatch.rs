use tsu::regex::{Matcher, RegexRouter, dispatch};
use tsu::{Engine, Handlers, Method, Request, Router, StatusCode};

async fn show_params(req: Request) -> String {
    req.params().iter()
        .map(|p| format!("{}:{}", p.key, p.value))
        .collect::<Vec<_>>()
        .join(" ")
}

fn engine() -> Engine {
    Router::new()
        .any("/users/{*any}", dispatch([
            Matcher::new(Method::GET, r"^/users/settings/$", Handlers::new().handler(show_params)),
            Matcher::new(Method::POST, r"/users/settings/$", Handlers::new().handler(show_params)),
            Matcher::new(Method::GET, r"^/users/(?P<user_id>\d+)/$", Handlers::new().handler(show_params)),
        ]))
        .fallback(RegexRouter::new().get(r"^/.*$", |_req: Request| async { "fallback" }))
        .build()
}

#[tokio::test]
async fn mounted_under_a_catch_all() {
    let engine = engine();

    let res = engine.handle(Request::new(Method::GET, "/users/12345/")).await;
    assert_eq!(res.body(), b"user_id:12345");

    let res = engine.handle(Request::new(Method::POST, "/users/settings/")).await;
    assert_eq!(res.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn patterns_without_groups_keep_the_mount_params() {
    let res = engine().handle(Request::new(Method::GET, "/users/settings/")).await;
    assert_eq!(res.body(), b"any:settings/");
}

#[tokio::test]
async fn a_dispatch_miss_is_a_literal_hit() {
    // The catch-all route matched, so the regex fallback never sees these.
    let engine = engine();

    let res = engine.handle(Request::new(Method::GET, "/users/alice/")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let res = engine.handle(Request::new(Method::DELETE, "/users/settings/")).await;
    assert_eq!(res.status_code(), StatusCode::NOT_FOUND);

    let res = engine.handle(Request::new(Method::GET, "/elsewhere")).await;
    assert_eq!(res.body(), b"fallback");
}
