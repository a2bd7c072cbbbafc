//! Default response headers.
//!
//! Every response carries permissive CORS headers so browser clients on
//! other origins can call the API. Preflight `OPTIONS` requests are answered
//! with `204` by the dispatcher.

use axum::http::{header, HeaderName, HeaderValue};

/// Methods advertised in `Access-Control-Allow-Methods`.
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS";

/// Headers applied to every response, overriding handler values.
pub fn default_headers() -> [(HeaderName, HeaderValue); 3] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ),
    ]
}
