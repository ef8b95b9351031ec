//! Tests for checkout endpoint validation.
//!
//! Note: These tests only cover validation errors that occur before any
//! Stripe API call is made. Full checkout flow testing would require HTTP
//! mocking.

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

#[path = "common/mod.rs"]
mod common;
use common::*;

fn full_checkout_body() -> serde_json::Value {
    json!({
        "productId": "12months-1device",
        "productName": "12 Months",
        "price": 59,
        "customerName": "Jane Doe",
        "customerEmail": "jane@example.com",
        "customerPhone": "+33612345678"
    })
}

#[tokio::test]
async fn test_create_checkout_session_missing_fields_returns_400() {
    let state = create_test_app_state();
    let app = api_app(state);

    for missing in [
        "productId",
        "productName",
        "price",
        "customerName",
        "customerEmail",
    ] {
        let mut body = full_checkout_body();
        body.as_object_mut().unwrap().remove(missing);

        let response = app
            .clone()
            .oneshot(json_request("/api/create-checkout-session", &body))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "missing {} should return 400 before any Stripe call",
            missing
        );
        let json = response_json(response).await;
        assert_eq!(json["details"], "Missing required fields");
    }
}

#[tokio::test]
async fn test_create_checkout_session_blank_fields_returns_400() {
    let state = create_test_app_state();
    let app = api_app(state);

    let mut body = full_checkout_body();
    body["customerEmail"] = json!("   ");

    let response = app
        .oneshot(json_request("/api/create-checkout-session", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_payment_intent_missing_fields_returns_400() {
    let state = create_test_app_state();
    let app = api_app(state);

    let response = app
        .oneshot(json_request(
            "/api/create-payment-intent",
            &json!({ "productId": "12months-1device" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["details"], "Missing required fields");
}

#[tokio::test]
async fn test_create_checkout_session_zero_price_returns_400() {
    let state = create_test_app_state();
    let app = api_app(state);

    let mut body = full_checkout_body();
    body["price"] = json!(0);

    let response = app
        .oneshot(json_request("/api/create-checkout-session", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_status_without_params_returns_400() {
    let state = create_test_app_state();
    let app = api_app(state);

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("GET")
                .uri("/api/checkout-session-status")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["details"], "Missing session_id or payment_intent");
}
