//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum Router around the compiled route table
//! - Wire up middleware (request ID, tracing, timeout, default headers)
//! - Dispatch requests to handler actions through their method maps
//! - Map handler errors to HTTP responses
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::error::{ApiError, ApiResult, RouterResult};
use crate::http::request::ApiRequest;
use crate::http::response::json_response;
use crate::i18n::Translations;
use crate::observability::metrics;
use crate::routing::matcher::RouteTable;
use crate::routing::router::RouteRule;
use crate::security::access_control::{RejectAll, TokenVerifier};
use crate::security::headers::default_headers;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub table: Arc<RouteTable>,
    pub settings: Arc<Settings>,
    pub translations: Arc<Translations>,
    pub verifier: Arc<dyn TokenVerifier>,
}

/// HTTP server for a finalized route table.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// Compile `rules` into a route table served with `settings`.
    pub fn new(settings: Settings, rules: Vec<RouteRule>) -> RouterResult<Self> {
        let table = RouteTable::new(rules)?;
        metrics::record_route_table(table.len());
        tracing::info!(routes = table.len(), "Route table compiled");

        let translations = Translations::new(settings.i18n.default_locale.clone());
        Ok(Self {
            state: AppState {
                table: Arc::new(table),
                settings: Arc::new(settings),
                translations: Arc::new(translations),
                verifier: Arc::new(RejectAll),
            },
        })
    }

    pub fn with_translations(mut self, translations: Translations) -> Self {
        self.state.translations = Arc::new(translations);
        self
    }

    pub fn with_verifier(mut self, verifier: impl TokenVerifier) -> Self {
        self.state.verifier = Arc::new(verifier);
        self
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    pub fn router(&self) -> Router {
        let settings = &self.state.settings;
        let mut router = Router::new()
            .fallback(dispatch)
            .with_state(self.state.clone())
            .layer(TimeoutLayer::new(Duration::from_secs(
                settings.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        for (name, value) in default_headers() {
            router = router.layer(SetResponseHeaderLayer::overriding(name, value));
        }
        router
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.table.len(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn settings(&self) -> &Settings {
        &self.state.settings
    }

    pub fn table(&self) -> &RouteTable {
        &self.state.table
    }
}

/// Fallback handler: match the path, then run the mapped action.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let Some(matched) = state.table.match_path(&path) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return not_found(&state);
    };
    let rule = &matched.route.rule;

    if method == Method::OPTIONS {
        metrics::record_request(method.as_str(), 204, &rule.pattern, start_time);
        return StatusCode::NO_CONTENT.into_response();
    }

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        pattern = %rule.pattern,
        "Dispatching request"
    );

    let response = match run_handler(&state, rule, matched.path_kwargs, request).await {
        Ok(response) => response,
        Err(err) => {
            if err.status_code().is_server_error() {
                tracing::error!(request_id = %request_id, path = %path, error = %err, "Handler failed");
            }
            err.into_response()
        }
    };

    metrics::record_request(
        method.as_str(),
        response.status().as_u16(),
        &rule.pattern,
        start_time,
    );
    response
}

async fn run_handler(
    state: &AppState,
    rule: &RouteRule,
    path_kwargs: std::collections::HashMap<String, String>,
    request: Request<Body>,
) -> ApiResult<Response> {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, state.settings.listener.max_body_bytes)
        .await
        .map_err(|e| {
            if exceeds_length_limit(&e) {
                ApiError::payload_too_large()
            } else {
                ApiError::bad_request().with_detail(e.to_string())
            }
        })?;
    let method = parts.method.clone();
    let request = ApiRequest::prepare(parts, body, path_kwargs, rule.kwargs.extra.clone(), state)?;

    match &rule.kwargs.method_map {
        Some(method_map) => {
            let action = method_map
                .get(&method)
                .ok_or_else(ApiError::method_not_allowed)?;
            rule.handler.call(action, request).await
        }
        None => rule.handler.handle(method, request).await,
    }
}

/// Whether a body read failed on the `max_body_bytes` limit.
fn exceeds_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

/// 404 for unmatched paths; in debug mode the body lists every pattern.
fn not_found(state: &AppState) -> Response {
    if state.settings.debug {
        json_response(StatusCode::NOT_FOUND, &state.table.patterns())
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
