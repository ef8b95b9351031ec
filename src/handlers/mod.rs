pub mod cancel;
pub mod checkout;
pub mod conversion;
pub mod tracking;
pub mod webhooks;
pub mod whatsapp;

pub use cancel::{confirm_cancellation, request_cancellation};
pub use checkout::{checkout_session_status, create_checkout_session, create_payment_intent};
pub use conversion::track_conversion;
pub use tracking::track_event;
pub use webhooks::handle_stripe_webhook;
pub use whatsapp::whatsapp_link;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::config::RateLimitConfig;
use crate::rate_limit::Tier;
use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Full API router with per-tier rate limiting.
///
/// Strict tier covers everything that triggers a Stripe API call; the
/// webhook receiver is unthrottled since Stripe retries on 429.
pub fn router(limits: RateLimitConfig) -> Router<AppState> {
    let strict = Router::new()
        .route("/api/create-checkout-session", post(create_checkout_session))
        .route("/api/create-payment-intent", post(create_payment_intent))
        .route("/api/cancel/request", post(request_cancellation))
        .route("/api/cancel/confirm", post(confirm_cancellation))
        .route_layer(Tier::Strict.layer(&limits));

    let standard = Router::new()
        .route("/api/checkout-session-status", get(checkout_session_status))
        .route("/api/track-checkout", post(track_event))
        .route("/api/track-whatsapp", post(track_event))
        .route("/api/track-conversion", post(track_conversion))
        .route("/api/whatsapp-link", get(whatsapp_link))
        .route_layer(Tier::Standard.layer(&limits));

    let relaxed = Router::new()
        .route("/health", get(health))
        .route_layer(Tier::Relaxed.layer(&limits));

    Router::new()
        .merge(strict)
        .merge(standard)
        .merge(relaxed)
        .route("/api/stripe-webhook", post(handle_stripe_webhook))
}
