//! Test utilities and fixtures for Streamcart integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

pub use streamcart::cancel::CancelTokenStore;
pub use streamcart::handlers::{
    checkout_session_status, confirm_cancellation, create_checkout_session, create_payment_intent,
    handle_stripe_webhook, request_cancellation, track_conversion, track_event, whatsapp_link,
};
pub use streamcart::payments::StripeClient;
pub use streamcart::relay::{MetaClient, TikTokClient};
pub use streamcart::sheets::SheetClient;
pub use streamcart::state::{AppState, PriceIds};

/// Webhook secret used by the test Stripe client.
pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Create an AppState for testing.
///
/// Ad-platform and sheet clients are left unconfigured so handlers
/// short-circuit before any outbound call.
pub fn create_test_app_state() -> AppState {
    AppState {
        base_url: "http://localhost:3000".to_string(),
        stripe: StripeClient::new("sk_test_xxx", TEST_WEBHOOK_SECRET),
        meta: MetaClient::new(None, None),
        tiktok: TikTokClient::new(None, None),
        sheets: SheetClient::new(None),
        cancel_tokens: Arc::new(CancelTokenStore::new()),
        price_ids: PriceIds::default(),
        whatsapp_number: None,
        dev_mode: true,
    }
}

/// Create a Router with all API endpoints (without rate limiting for tests)
pub fn api_app(state: AppState) -> Router {
    Router::new()
        .route("/api/create-checkout-session", post(create_checkout_session))
        .route("/api/create-payment-intent", post(create_payment_intent))
        .route("/api/checkout-session-status", get(checkout_session_status))
        .route("/api/cancel/request", post(request_cancellation))
        .route("/api/cancel/confirm", post(confirm_cancellation))
        .route("/api/track-checkout", post(track_event))
        .route("/api/track-whatsapp", post(track_event))
        .route("/api/track-conversion", post(track_conversion))
        .route("/api/whatsapp-link", get(whatsapp_link))
        .route("/api/stripe-webhook", post(handle_stripe_webhook))
        .with_state(state)
}

/// Build a POST request with a JSON body.
pub fn json_request(uri: &str, body: &serde_json::Value) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Read a JSON response body.
pub async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("Response should be valid JSON")
}
