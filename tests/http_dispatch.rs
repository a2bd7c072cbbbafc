//! Request dispatch tests against the HTTP layer.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use restful_router::config::Settings;
use restful_router::http::HttpServer;
use restful_router::i18n::Translations;
use restful_router::routing::{HandlerSpec, Kwargs, PathConfig, ResourceRouter, Router};
use restful_router::security::JwtCodec;
use serde_json::{json, Value};

mod common;

use common::{
    all_actions, demo_server, empty_request, json_request, raw_get, read_json, send,
    start_server, test_settings, Echo,
};

fn echo_server() -> HttpServer {
    let mut router = ResourceRouter::new(PathConfig::new("/api", false));
    router
        .register(
            ["shops", "widgets"],
            Arc::new(Echo(HandlerSpec::new("widgets").actions(all_actions()))),
            Some(Kwargs::new().with("tenant", "acme")),
            Some("widgets"),
        )
        .unwrap();
    HttpServer::new(test_settings(), router.rules().unwrap()).unwrap()
}

#[tokio::test]
async fn test_unmatched_path_is_404() {
    let server = demo_server(test_settings());
    let response = send(&server, empty_request("GET", "/api/nothing")).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn test_debug_404_lists_patterns() {
    let mut settings = test_settings();
    settings.debug = true;
    let server = demo_server(settings);

    let (status, body) = read_json(send(&server, empty_request("GET", "/nowhere")).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let patterns: Vec<String> = serde_json::from_value(body).unwrap();
    assert_eq!(patterns.len(), 6);
    let mut sorted = patterns.clone();
    sorted.sort();
    assert_eq!(patterns, sorted);
    assert!(patterns.contains(&"/api/notes/(?P<pk>[^/.]+)".to_string()));
}

#[tokio::test]
async fn test_options_preflight_with_cors_headers() {
    let server = demo_server(test_settings());
    let response = send(&server, empty_request("OPTIONS", "/api/notes")).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_METHODS],
        "GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS"
    );
}

#[tokio::test]
async fn test_unmapped_method_is_405() {
    let server = demo_server(test_settings());
    let (status, body) = read_json(send(&server, empty_request("DELETE", "/api/notes")).await).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"message": "Method Not Allowed", "detail": null}));

    let response = send(&server, empty_request("POST", "/api/authors/1/books")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_action_receives_lookups_and_kwargs() {
    let server = echo_server();
    let request = Request::builder()
        .method("PATCH")
        .uri("/api/shops/s1/widgets/w9")
        .header("content-type", "application/json")
        .header("accept-language", "de;q=0.4, fr")
        .body(Body::from(r#"{"colour": "red"}"#))
        .unwrap();

    let (status, body) = read_json(send(&server, request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "partial_update");
    assert_eq!(body["path_kwargs"], json!({"shop_pk": "s1", "widget_pk": "w9"}));
    assert_eq!(body["kwargs"], json!({"tenant": "acme"}));
    assert_eq!(body["data"], json!({"colour": "red"}));
    assert_eq!(body["locale"], "fr");
}

#[tokio::test]
async fn test_handler_error_carries_detail() {
    let server = echo_server();
    let (status, body) =
        read_json(send(&server, empty_request("GET", "/api/shops/s1/widgets?fail=1")).await).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, json!({"message": "Conflict", "detail": "requested failure"}));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let server = demo_server(test_settings());
    let request = Request::builder()
        .method("POST")
        .uri("/api/notes")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&server, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_notes_crud() {
    let server = demo_server(test_settings());

    let response = send(&server, json_request("POST", "/api/notes", json!({"title": "first"}))).await;
    let (status, created) = read_json(response).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created, json!({"id": 1, "title": "first", "body": ""}));

    let (status, note) = read_json(send(&server, empty_request("GET", "/api/notes/1")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["title"], "first");

    let response = send(&server, json_request("PATCH", "/api/notes/1", json!({"body": "text"}))).await;
    let (status, patched) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched, json!({"id": 1, "title": "first", "body": "text"}));

    let response = send(&server, json_request("PUT", "/api/notes/1", json!({"title": "second"}))).await;
    let (_, replaced) = read_json(response).await;
    assert_eq!(replaced, json!({"id": 1, "title": "second", "body": ""}));

    let response = send(&server, empty_request("DELETE", "/api/notes/1")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&server, empty_request("GET", "/api/notes/1")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_validation_errors_are_400_with_fields() {
    let server = demo_server(test_settings());
    let response = send(&server, json_request("POST", "/api/notes", json!({"title": " "}))).await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], json!({"title": ["may not be blank"]}));
}

#[tokio::test]
async fn test_list_pagination() {
    let mut settings = test_settings();
    settings.pagination.page_size = 2;
    let server = demo_server(settings);
    for title in ["a", "b", "c"] {
        send(&server, json_request("POST", "/api/notes", json!({"title": title}))).await;
    }

    let (_, page) = read_json(send(&server, empty_request("GET", "/api/notes?offset=1")).await).await;
    let ids: Vec<u64> = page
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![2, 3]);

    let (_, page) = read_json(send(&server, empty_request("GET", "/api/notes?limit=10")).await).await;
    assert_eq!(page.as_array().unwrap().len(), 2);

    let response = send(&server, empty_request("GET", "/api/notes?limit=many")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_requires_verified_token() {
    let server = demo_server(test_settings()).with_verifier(|token: &str| {
        (token == "good").then(|| json!({"id": 7, "name": "ada"}))
    });

    let response = send(&server, empty_request("GET", "/api/profile")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/profile")
        .header("authorization", "Bearer bad")
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&server, request).await.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/profile")
        .header("authorization", "Bearer good")
        .body(Body::empty())
        .unwrap();
    let (status, body) = read_json(send(&server, request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 7, "name": "ada"}));
}

#[tokio::test]
async fn test_profile_with_signed_tokens() {
    let codec = JwtCodec::new(b"s3cret", "HS256").unwrap();
    let claims = json!({"id": 7, "name": "ada"}).as_object().cloned().unwrap();
    let valid = codec.generate(claims.clone()).unwrap();
    let expired = codec.generate_expiring(claims, -60).unwrap();
    let server = demo_server(test_settings()).with_verifier(codec);

    let request = Request::builder()
        .uri("/api/profile")
        .header("authorization", format!("Bearer {valid}"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = read_json(send(&server, request).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "ada");

    let request = Request::builder()
        .uri("/api/profile")
        .header("authorization", format!("Bearer {expired}"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(send(&server, request).await.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_path_lookups_are_unquoted() {
    let server = demo_server(test_settings());
    let (status, body) = read_json(
        send(&server, empty_request("GET", "/api/authors/j%20doe/books/b%2B1")).await,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["author"], "j doe");
    assert_eq!(body["id"], "b+1");
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let mut settings = test_settings();
    settings.listener.max_body_bytes = 16;
    let server = demo_server(settings);

    let response = send(
        &server,
        json_request("POST", "/api/notes", json!({"title": "far more than sixteen bytes"})),
    )
    .await;
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["message"], "Payload Too Large");

    let response = send(&server, json_request("POST", "/api/notes", json!({"title": "ok"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_generic_handler_sees_raw_method() {
    let mut translations = Translations::new("en");
    translations.insert("fr", json!({"ok": "d'accord"}));
    let server = demo_server(test_settings()).with_translations(translations);

    let (status, body) = read_json(send(&server, empty_request("GET", "/api/health")).await).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let request = Request::builder()
        .uri("/api/health")
        .header("accept-language", "fr-FR")
        .body(Body::empty())
        .unwrap();
    let (_, body) = read_json(send(&server, request).await).await;
    assert_eq!(body["status"], "d'accord");

    let response = send(&server, empty_request("POST", "/api/health")).await;
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_request_id_is_set_and_propagated() {
    let server = demo_server(test_settings());
    let response = send(&server, empty_request("GET", "/api/health")).await;
    assert!(response.headers().contains_key("x-request-id"));

    let request = Request::builder()
        .uri("/api/health")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();
    let response = send(&server, request).await;
    assert_eq!(response.headers()["x-request-id"], "trace-123");
}

#[tokio::test]
async fn test_json_bodies_escape_closing_tags() {
    let server = demo_server(test_settings());
    let response = send(
        &server,
        json_request("POST", "/api/notes", json!({"title": "</script>"})),
    )
    .await;
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json; charset=UTF-8"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains(r"<\/script>"));
    assert!(text.ends_with('\n'));
}

#[tokio::test]
async fn test_trailing_slash_routes_over_socket() {
    let mut settings = Settings::default();
    settings.routing.api_prefix = "/v1".into();
    settings.routing.trailing_slash = true;
    let addr = start_server(demo_server(settings)).await;

    let response = raw_get(addr, "/v1/authors/3/books/9/").await;
    assert!(response.starts_with("HTTP/1.1 200 OK"));
    assert!(response.contains(r#""title": "Book 9 by author 3""#));

    let response = raw_get(addr, "/v1/authors/3/books/9").await;
    assert!(response.starts_with("HTTP/1.1 404 Not Found"));
}
