//! Response helpers.
//!
//! # Responsibilities
//! - Render JSON bodies the way every handler should answer
//! - Provide the empty 204 used for `OPTIONS` and deletions
//!
//! # Design Decisions
//! - JSON is pretty printed (2 spaces) with a trailing newline
//! - `</` is escaped as `<\/` so bodies are safe to inline in HTML
//! - Serialization failures become a bare 500, never a panic

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Content type set on every JSON body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Serialize `value` into the canonical JSON body text.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    let text = serde_json::to_string_pretty(value)?;
    Ok(text.replace("</", "<\\/") + "\n")
}

/// Build a JSON response with the given status.
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response {
    match render_json(value) {
        Ok(body) => {
            let mut response = Response::new(Body::from(body));
            *response.status_mut() = status;
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            );
            response
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `200 OK` with a JSON body.
pub fn ok<T: Serialize + ?Sized>(value: &T) -> Response {
    json_response(StatusCode::OK, value)
}

/// `201 Created` with a JSON body.
pub fn created<T: Serialize + ?Sized>(value: &T) -> Response {
    json_response(StatusCode::CREATED, value)
}

/// `204 No Content`.
pub fn no_content() -> Response {
    StatusCode::NO_CONTENT.into_response()
}
