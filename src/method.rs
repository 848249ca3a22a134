//! HTTP methods.
//!
//! tsu uses [`http::Method`] directly: RFC 9110 methods as associated
//! constants (`Method::GET`), everything else (WebDAV verbs, `PURGE` for
//! nginx / Varnish cache invalidation) through `Method::from_bytes`. Both
//! routers key their tables by method, so custom tokens route like any other.

pub use http::Method;

/// The methods covered by the `any` registration helpers.
pub(crate) const ANY: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::DELETE,
    Method::CONNECT,
    Method::TRACE,
];
