//! Unified error types.

use http::Method;

/// The error type returned by tsu's fallible runtime operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: parsing the bind address, binding to a port.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid socket address `{0}`")]
    Addr(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// A route configuration mistake.
///
/// These are programming errors, not runtime conditions. The infallible
/// registration calls ([`RegexRouter::handle`](crate::regex::RegexRouter::handle)
/// and friends) panic with this error's message; only
/// [`RegexRouter::try_handle`](crate::regex::RegexRouter::try_handle) hands it
/// back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("invalid regex route `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("register duplicate regex route: {method} {pattern}")]
    Duplicate { method: Method, pattern: String },

    #[error("regex route {method} {pattern} has no handlers")]
    NoHandlers { method: Method, pattern: String },
}
