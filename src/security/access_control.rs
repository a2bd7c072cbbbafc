//! Bearer token extraction and verification.
//!
//! The request layer calls through [`TokenVerifier`]; [`crate::security::jwt`]
//! provides the production implementation.

use axum::http::{header, HeaderMap};
use serde_json::Value;

/// Turns a bearer token into the claims of the current user.
pub trait TokenVerifier: Send + Sync + 'static {
    /// Claims for a valid token, `None` for anything else.
    fn verify(&self, token: &str) -> Option<Value>;
}

/// Verifier that accepts no token. Used when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAll;

impl TokenVerifier for RejectAll {
    fn verify(&self, _token: &str) -> Option<Value> {
        None
    }
}

impl<F> TokenVerifier for F
where
    F: Fn(&str) -> Option<Value> + Send + Sync + 'static,
{
    fn verify(&self, token: &str) -> Option<Value> {
        self(token)
    }
}

/// Extract the token from `Authorization: <prefix> <token>`.
///
/// The header must start with `prefix` and split into exactly two
/// whitespace separated parts; anything else yields `None`.
pub fn parse_token(headers: &HeaderMap, prefix: &str) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    if !value.starts_with(prefix) {
        return None;
    }
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(token), None) => Some(token.to_string()),
        _ => None,
    }
}
