mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use catfy_api::{app::build_router, services::auth_service};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let app = build_router(common::offline_state());
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_route_reports_ok() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn unknown_route_is_enveloped_404() {
    let (status, body) = send(get("/api/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["data"]["error"], "Not Found");
}

#[tokio::test]
async fn api_docs_are_served() {
    let app = build_router(common::offline_state());
    let response = app.oneshot(get("/docs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn catalogues_require_a_token() {
    let (status, _) = send(get("/api/catalogues")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/catalogues")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_routes_reject_regular_users() {
    let state = common::offline_state();
    let token =
        auth_service::issue_token(&state, Uuid::new_v4(), "someone@example.com", "user").unwrap();
    let request = Request::builder()
        .uri("/api/admin/stats")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = build_router(state).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn coupon_is_invalid_while_billing_is_disabled() {
    let (status, body) = send(post_json(
        "/api/coupons/validate",
        json!({ "code": "SPRING25", "plan": "monthly" }),
    ))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["original_price"], "19.00");
    assert_eq!(body["data"]["final_price"], "19.00");
}

#[tokio::test]
async fn anonymous_theme_list_locks_premium_themes() {
    let (status, body) = send(get("/api/themes")).await;
    assert_eq!(status, StatusCode::OK);

    let items = body["data"]["items"].as_array().expect("theme list");
    assert!(!items.is_empty());
    for theme in items {
        assert_eq!(theme["available"], !theme["premium"].as_bool().unwrap());
    }
}

#[tokio::test]
async fn webhook_without_signature_is_rejected() {
    let (status, _) = send(post_json(
        "/api/billing/webhook",
        json!({ "type": "invoice.paid", "data": { "object": {} } }),
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = build_router(common::offline_state());
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "req-42")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "req-42");
}
