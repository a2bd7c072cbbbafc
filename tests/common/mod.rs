//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use restful_router::config::Settings;
use restful_router::error::{ApiError, ApiResult};
use restful_router::http::response::ok;
use restful_router::http::{ApiRequest, HttpServer};
use restful_router::routing::{Action, Handler, HandlerSpec, PathConfig};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

/// Handler that only declares a capability record.
pub struct Stub(pub HandlerSpec);

impl Handler for Stub {
    fn spec(&self) -> HandlerSpec {
        self.0.clone()
    }
}

pub fn stub(spec: HandlerSpec) -> Arc<dyn Handler> {
    Arc::new(Stub(spec))
}

/// Handler that echoes the action it was dispatched to.
pub struct Echo(pub HandlerSpec);

impl Handler for Echo {
    fn spec(&self) -> HandlerSpec {
        self.0.clone()
    }

    fn call(
        &self,
        action: Action,
        request: ApiRequest,
    ) -> BoxFuture<'_, ApiResult<axum::response::Response>> {
        Box::pin(async move {
            if request.query_argument("fail").is_some() {
                return Err(ApiError::conflict().with_detail("requested failure"));
            }
            Ok(ok(&json!({
                "action": action.as_str(),
                "path_kwargs": request.path_kwargs(),
                "kwargs": request.kwargs(),
                "data": request.data(),
                "locale": request.locale(),
            })))
        })
    }
}

pub fn all_actions() -> [Action; 6] {
    [
        Action::List,
        Action::Create,
        Action::Retrieve,
        Action::Update,
        Action::PartialUpdate,
        Action::Destroy,
    ]
}

/// Settings used by dispatch tests.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.routing.api_prefix = "/api".into();
    settings
}

/// Server over the demo routes with `settings`.
pub fn demo_server(settings: Settings) -> HttpServer {
    let rules = restful_router::demo::routes(&PathConfig::from(&settings.routing)).unwrap();
    HttpServer::new(settings, rules).unwrap()
}

/// Send one request through the router without a socket.
pub async fn send(server: &HttpServer, request: Request<Body>) -> Response<Body> {
    server.router().oneshot(request).await.unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Status and parsed JSON body (`Value::Null` for empty bodies).
pub async fn read_json(response: Response<Body>) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Start `server` on an ephemeral port.
pub async fn start_server(server: HttpServer) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// Minimal HTTP/1.1 GET over a raw socket, returning the full response text.
pub async fn raw_get(addr: SocketAddr, path: &str) -> String {
    let mut socket = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    socket.write_all(request.as_bytes()).await.unwrap();

    let mut response = String::new();
    socket.read_to_string(&mut response).await.unwrap();
    response
}
