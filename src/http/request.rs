//! Request preparation.
//!
//! # Responsibilities
//! - Parse JSON bodies and bearer tokens before any action runs
//! - Negotiate the request locale from `Accept-Language`
//! - Expose path lookups, query arguments and pagination to handlers
//!
//! # Design Decisions
//! - Only `Content-Type: application/json` bodies are parsed; others are
//!   left to the handler as raw bytes
//! - A malformed JSON body fails the request with 400 before dispatch
//! - Token verification runs once; claims travel with the request

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::Query;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::i18n::Translations;
use crate::security::access_control::parse_token;

/// A prepared request handed to handler actions.
pub struct ApiRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    data: Option<Value>,
    token: Option<String>,
    current_user: Option<Value>,
    locale: String,
    path_kwargs: HashMap<String, String>,
    query: HashMap<String, String>,
    kwargs: Map<String, Value>,
    page_size: i64,
    translations: Arc<Translations>,
}

impl ApiRequest {
    /// Parse body, token, query and locale for a matched request.
    pub fn prepare(
        parts: Parts,
        body: Bytes,
        path_kwargs: HashMap<String, String>,
        kwargs: Map<String, Value>,
        state: &AppState,
    ) -> ApiResult<Self> {
        let settings = &state.settings;
        let data = parse_body(&parts.headers, &body)?;
        let token = parse_token(&parts.headers, &settings.auth.header_prefix);
        let current_user = token.as_deref().and_then(|t| state.verifier.verify(t));
        let locale = negotiate_locale(&parts.headers, &settings.i18n.default_locale);
        let query = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .map(|Query(q)| q)
            .map_err(|e| ApiError::bad_request().with_detail(e.body_text()))?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            data,
            token,
            current_user,
            locale,
            path_kwargs,
            query,
            kwargs,
            page_size: settings.pagination.page_size,
            translations: state.translations.clone(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Raw request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parsed JSON body, when the request declared one.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Deserialize the JSON body; a missing or mismatched body is a 400.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let data = self.data.clone().ok_or_else(ApiError::bad_request)?;
        serde_json::from_value(data).map_err(|e| ApiError::bad_request().with_detail(e.to_string()))
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Claims of the verified user, if any.
    pub fn current_user(&self) -> Option<&Value> {
        self.current_user.as_ref()
    }

    /// Claims of the verified user, or 401.
    pub fn authenticated(&self) -> ApiResult<&Value> {
        self.current_user.as_ref().ok_or_else(ApiError::unauthorized)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Value captured by a lookup variable.
    pub fn path_kwarg(&self, name: &str) -> Option<&str> {
        self.path_kwargs.get(name).map(String::as_str)
    }

    pub fn path_kwargs(&self) -> &HashMap<String, String> {
        &self.path_kwargs
    }

    /// Registration kwargs of the matched rule.
    pub fn kwargs(&self) -> &Map<String, Value> {
        &self.kwargs
    }

    pub fn query_argument(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// `(limit, offset)` from the query string.
    ///
    /// `limit` defaults to the configured page size and never exceeds it;
    /// `offset` defaults to 0. Non-integer values are a 400.
    pub fn paginate(&self) -> ApiResult<(i64, i64)> {
        let parse = |name: &str, default: i64| -> ApiResult<i64> {
            match self.query_argument(name) {
                Some(raw) => raw.trim().parse().map_err(|_| ApiError::bad_request()),
                None => Ok(default),
            }
        };
        let limit = parse("limit", self.page_size)?;
        let offset = parse("offset", 0)?;
        Ok((limit.min(self.page_size), offset))
    }

    /// Translate `placeholder` into the request locale.
    pub fn t(&self, placeholder: &str, args: &[(&str, &str)]) -> String {
        self.translations.translate(&self.locale, placeholder, args)
    }
}

/// Parse a JSON body when the content type is exactly `application/json`.
pub fn parse_body(headers: &HeaderMap, body: &Bytes) -> ApiResult<Option<Value>> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .is_some_and(|v| v.as_bytes() == b"application/json");
    if !is_json {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|_| ApiError::bad_request())
}

/// Pick the highest weighted language from `Accept-Language`.
///
/// Entries without `q=` weigh 1.0, unparsable weights 0.0. Ties keep
/// header order.
pub fn negotiate_locale(headers: &HeaderMap, default: &str) -> String {
    let Some(header) = headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
    else {
        return default.to_string();
    };

    let mut locales: Vec<(&str, f64)> = header
        .split(',')
        .map(|language| {
            let mut parts = language.trim().split(';');
            let code = parts.next().unwrap_or_default();
            let score = match parts.next() {
                Some(q) if q.starts_with("q=") => q[2..].parse().unwrap_or(0.0),
                _ => 1.0,
            };
            (code, score)
        })
        .collect();

    locales.sort_by(|a, b| b.1.total_cmp(&a.1));
    locales
        .first()
        .map(|(code, _)| code.to_string())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_header(name: header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_json_body() {
        let headers = with_header(header::CONTENT_TYPE, "application/json");
        let data = parse_body(&headers, &Bytes::from_static(br#"{"title": "a"}"#)).unwrap();
        assert_eq!(data, Some(serde_json::json!({"title": "a"})));
    }

    #[test]
    fn test_parse_body_ignores_other_content_types() {
        let headers = with_header(header::CONTENT_TYPE, "application/json; charset=utf-8");
        assert_eq!(parse_body(&headers, &Bytes::from_static(b"{}")).unwrap(), None);
        assert_eq!(parse_body(&HeaderMap::new(), &Bytes::from_static(b"{}")).unwrap(), None);
    }

    #[test]
    fn test_parse_malformed_json() {
        let headers = with_header(header::CONTENT_TYPE, "application/json");
        let err = parse_body(&headers, &Bytes::from_static(b"{oops")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BadRequest);
    }

    #[test]
    fn test_negotiate_locale() {
        let headers = with_header(header::ACCEPT_LANGUAGE, "fr;q=0.5, zh-CN, en;q=0.8");
        assert_eq!(negotiate_locale(&headers, "en"), "zh-CN");

        let headers = with_header(header::ACCEPT_LANGUAGE, "de;q=abc, pt;q=0.1");
        assert_eq!(negotiate_locale(&headers, "en"), "pt");

        assert_eq!(negotiate_locale(&HeaderMap::new(), "en"), "en");
    }

    #[test]
    fn test_negotiate_locale_ties_keep_order() {
        let headers = with_header(header::ACCEPT_LANGUAGE, "es, it");
        assert_eq!(negotiate_locale(&headers, "en"), "es");
    }
}
