use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::{msg, AppError, Result};
use crate::extractors::{Json, Query};
use crate::payments::CheckoutMetadata;
use crate::products::{self, CheckoutMode};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    /// Request subscription mode with a 24h trial. Only honored when a
    /// recurring Price ID is configured for the product.
    #[serde(default)]
    pub use_subscription: bool,
}

/// The validated fields of a checkout request.
struct ValidatedCheckout {
    product_id: String,
    price: f64,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
}

/// Reject before anything reaches Stripe: all required fields present and
/// non-empty, price positive. The client sends productName but the catalog
/// decides what Stripe sees.
fn validate(request: &CheckoutRequest) -> Result<ValidatedCheckout> {
    fn required(field: &Option<String>) -> Option<String> {
        field
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
    }

    let product_id = required(&request.product_id);
    let product_name = required(&request.product_name);
    let customer_name = required(&request.customer_name);
    let customer_email = required(&request.customer_email);
    let price = request.price.filter(|p| *p > 0.0);

    match (product_id, product_name, customer_name, customer_email, price) {
        (Some(product_id), Some(_), Some(customer_name), Some(customer_email), Some(price)) => {
            Ok(ValidatedCheckout {
                product_id,
                price,
                customer_name,
                customer_email,
                customer_phone: required(&request.customer_phone).unwrap_or_default(),
            })
        }
        _ => Err(AppError::BadRequest(msg::MISSING_REQUIRED_FIELDS.into())),
    }
}

fn build_metadata(checkout: &ValidatedCheckout, product_name: &str) -> CheckoutMetadata {
    CheckoutMetadata {
        product_id: checkout.product_id.clone(),
        product_name: product_name.to_string(),
        customer_name: checkout.customer_name.clone(),
        customer_email: checkout.customer_email.clone(),
        customer_phone: checkout.customer_phone.clone(),
        price: format_price(checkout.price),
    }
}

/// Render the price the way the storefront sent it ("59" not "59.0").
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{}", price)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub client_secret: Option<String>,
    pub session_id: String,
    pub mode: &'static str,
}

/// POST /api/create-checkout-session
///
/// Creates an embedded Stripe Checkout Session. Subscription mode (with a
/// 24h trial) when the client opted in and a recurring Price ID is
/// configured; one-time payment mode otherwise.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSessionResponse>> {
    let use_subscription = request.use_subscription;
    let checkout = validate(&request)?;

    let product = products::get(&checkout.product_id);
    let price_id = state.price_ids.for_product(&checkout.product_id);
    let metadata = build_metadata(&checkout, product.name);
    let return_url = format!(
        "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
        state.base_url
    );

    let mode = products::checkout_mode(price_id, use_subscription);

    let session = match mode {
        CheckoutMode::Subscription(price_id) => {
            state
                .stripe
                .create_subscription_session(
                    price_id,
                    &checkout.customer_email,
                    &metadata,
                    &return_url,
                )
                .await?
        }
        CheckoutMode::Payment => {
            // Charge the price the storefront quoted, in cents
            let amount_cents = (checkout.price * 100.0).round() as i64;
            state
                .stripe
                .create_payment_session(
                    &product,
                    amount_cents,
                    &checkout.customer_email,
                    &metadata,
                    &return_url,
                )
                .await?
        }
    };

    tracing::info!(
        session_id = %session.id,
        product_id = %checkout.product_id,
        mode = mode.as_str(),
        "Checkout session created"
    );

    Ok(Json(CheckoutSessionResponse {
        client_secret: session.client_secret,
        session_id: session.id,
        mode: mode.as_str(),
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: Option<String>,
}

/// POST /api/create-payment-intent
///
/// Creates a PaymentIntent for the custom payment-element flow. The
/// description and statement suffix come from the catalog's generic
/// product names, never from client input.
pub async fn create_payment_intent(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<PaymentIntentResponse>> {
    let checkout = validate(&request)?;

    let product = products::get(&checkout.product_id);
    let metadata = build_metadata(&checkout, product.name);
    let amount_cents = (checkout.price * 100.0).round() as i64;

    let intent = state
        .stripe
        .create_payment_intent(
            amount_cents,
            product.description,
            product.name,
            &checkout.customer_email,
            &metadata,
        )
        .await?;

    tracing::info!(
        intent_id = %intent.id,
        product_id = %checkout.product_id,
        "Payment intent created"
    );

    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
    }))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub payment_intent: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    pub metadata: std::collections::HashMap<String, String>,
}

/// GET /api/checkout-session-status
///
/// Read-through status proxy for the success page. Accepts either a
/// payment intent ID (payment-element flow) or a checkout session ID
/// (embedded checkout flow).
pub async fn checkout_session_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>> {
    if let Some(ref intent_id) = query.payment_intent {
        let intent = state.stripe.get_payment_intent(intent_id).await?;

        // Normalize "succeeded" to the session-style complete/paid pair so
        // the success page has one shape to deal with
        let (status, payment_status) = if intent.status == "succeeded" {
            ("complete".to_string(), "paid".to_string())
        } else {
            (intent.status.clone(), intent.status.clone())
        };

        return Ok(Json(StatusResponse {
            status,
            payment_status,
            customer_email: intent.receipt_email,
            metadata: intent.metadata,
        }));
    }

    if let Some(ref session_id) = query.session_id {
        let session = state.stripe.get_checkout_session(session_id).await?;

        return Ok(Json(StatusResponse {
            status: session.status.unwrap_or_else(|| "unknown".to_string()),
            payment_status: session
                .payment_status
                .unwrap_or_else(|| "unknown".to_string()),
            customer_email: session.customer_details.and_then(|d| d.email),
            metadata: session.metadata,
        }));
    }

    Err(AppError::BadRequest(msg::MISSING_SESSION_OR_INTENT.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CheckoutRequest {
        CheckoutRequest {
            product_id: Some("12months-1device".into()),
            product_name: Some("12 Months".into()),
            price: Some(59.0),
            customer_name: Some("Jane Doe".into()),
            customer_email: Some("jane@example.com".into()),
            customer_phone: None,
            use_subscription: false,
        }
    }

    #[test]
    fn test_validate_accepts_full_request() {
        let v = validate(&full_request()).unwrap();
        assert_eq!(v.product_id, "12months-1device");
        assert_eq!(v.customer_phone, "");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        for strip in [
            |r: &mut CheckoutRequest| r.product_id = None,
            |r: &mut CheckoutRequest| r.product_name = None,
            |r: &mut CheckoutRequest| r.price = None,
            |r: &mut CheckoutRequest| r.customer_name = None,
            |r: &mut CheckoutRequest| r.customer_email = None,
        ] {
            let mut request = full_request();
            strip(&mut request);
            assert!(validate(&request).is_err());
        }
    }

    #[test]
    fn test_validate_rejects_blank_and_nonpositive() {
        let mut request = full_request();
        request.customer_email = Some("   ".into());
        assert!(validate(&request).is_err());

        let mut request = full_request();
        request.price = Some(0.0);
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(59.0), "59");
        assert_eq!(format_price(39.5), "39.5");
    }
}
