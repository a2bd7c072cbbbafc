//! Error types.
//!
//! Two families live here:
//! - [`RouterError`]: configuration mistakes found while registering handlers
//!   or building the route table. Always fatal at startup.
//! - [`ApiError`]: exceptions raised by handlers while serving a request,
//!   rendered as a JSON body with the matching status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use thiserror::Error;

use crate::http::response::json_response;

/// Configuration errors raised by routers.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A resource name contains characters outside `[a-zA-Z0-9_-]`.
    #[error("Invalid resource name `{0}`.")]
    InvalidResourceName(String),

    /// Lookup overrides disagree with each other or with the resource count.
    #[error(
        "Handler `{handler}` declares {kwargs} lookup url kwargs and {regexs} lookup value regexs for {resources} resources."
    )]
    LookupLengthMismatch {
        handler: String,
        resources: usize,
        kwargs: usize,
        regexs: usize,
    },

    /// A finalized pattern is not a valid regular expression.
    #[error("Invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Result type for router operations.
pub type RouterResult<T> = Result<T, RouterError>;

/// The kinds of exception a handler can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    PayloadTooLarge,
    Internal,
}

impl ErrorKind {
    /// HTTP status associated with this kind.
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Fixed human readable message.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::BadRequest => "Bad Request",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::Forbidden => "Forbidden",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::MethodNotAllowed => "Method Not Allowed",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::PayloadTooLarge => "Payload Too Large",
            ErrorKind::Internal => "Internal Server Error",
        }
    }
}

/// Exception raised by a handler, carrying a status and optional detail.
#[derive(Debug, Clone, Error)]
#[error("{}", kind.message())]
pub struct ApiError {
    kind: ErrorKind,
    detail: Option<Value>,
}

impl ApiError {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, detail: None }
    }

    pub fn bad_request() -> Self {
        Self::new(ErrorKind::BadRequest)
    }

    pub fn unauthorized() -> Self {
        Self::new(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::new(ErrorKind::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(ErrorKind::MethodNotAllowed)
    }

    pub fn conflict() -> Self {
        Self::new(ErrorKind::Conflict)
    }

    pub fn payload_too_large() -> Self {
        Self::new(ErrorKind::PayloadTooLarge)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    /// Attach a JSON detail payload.
    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status_code(&self) -> StatusCode {
        self.kind.status_code()
    }

    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "message": self.kind.message(),
            "detail": self.detail,
        });
        json_response(self.status_code(), &body)
    }
}

/// Result type for handler actions.
pub type ApiResult<T> = Result<T, ApiError>;
