use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::msg;
use crate::payments::StripeWebhookEvent;
use crate::state::AppState;

/// POST /api/stripe-webhook
///
/// Verifies the Stripe signature and logs the event payload. No state is
/// changed here: fulfillment is manual (WhatsApp) and the success page
/// polls Stripe directly, so the webhook is an audit trail.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let Some(signature) = headers.get("stripe-signature").and_then(|v| v.to_str().ok()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": msg::MISSING_SIGNATURE })),
        );
    };

    match state.stripe.verify_webhook_signature(&body, signature) {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("Stripe webhook signature verification failed");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": msg::INVALID_SIGNATURE })),
            );
        }
        Err(e) => {
            tracing::warn!("Stripe webhook signature error: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": msg::INVALID_SIGNATURE })),
            );
        }
    }

    let event: StripeWebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Failed to parse Stripe webhook: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON" })),
            );
        }
    };

    log_event(&event);

    (StatusCode::OK, Json(json!({ "received": true })))
}

fn log_event(event: &StripeWebhookEvent) {
    let object = &event.data.object;

    match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            tracing::info!(
                id = object["id"].as_str().unwrap_or_default(),
                amount = object["amount"].as_i64().unwrap_or_default(),
                currency = object["currency"].as_str().unwrap_or_default(),
                email = object["receipt_email"].as_str().unwrap_or_default(),
                metadata = %object["metadata"],
                "Payment succeeded"
            );
        }
        "payment_intent.payment_failed" => {
            tracing::warn!(
                id = object["id"].as_str().unwrap_or_default(),
                error = object["last_payment_error"]["message"]
                    .as_str()
                    .unwrap_or_default(),
                email = object["receipt_email"].as_str().unwrap_or_default(),
                "Payment failed"
            );
        }
        "checkout.session.completed" => {
            tracing::info!(
                id = object["id"].as_str().unwrap_or_default(),
                customer_email = object["customer_details"]["email"]
                    .as_str()
                    .unwrap_or_default(),
                amount_total = object["amount_total"].as_i64().unwrap_or_default(),
                metadata = %object["metadata"],
                "Checkout completed"
            );
        }
        other => {
            tracing::debug!("Unhandled Stripe event type: {}", other);
        }
    }
}
