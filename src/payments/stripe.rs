use std::collections::HashMap;

use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::{msg, AppError, Result};
use crate::products::Product;

type HmacSha256 = Hmac<Sha256>;

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Metadata attached to every checkout session and payment intent, and
/// echoed back to the success page when it polls for status.
#[derive(Debug, Clone)]
pub struct CheckoutMetadata {
    pub product_id: String,
    pub product_name: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub price: String,
}

impl CheckoutMetadata {
    /// Render as Stripe form fields under the given key prefix
    /// (e.g. "metadata" or "subscription_data[metadata]").
    fn form_fields(&self, prefix: &str) -> Vec<(String, String)> {
        vec![
            (format!("{}[productId]", prefix), self.product_id.clone()),
            (format!("{}[productName]", prefix), self.product_name.clone()),
            (format!("{}[customerName]", prefix), self.customer_name.clone()),
            (format!("{}[customerEmail]", prefix), self.customer_email.clone()),
            (format!("{}[customerPhone]", prefix), self.customer_phone.clone()),
            (format!("{}[price]", prefix), self.price.clone()),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatedCheckoutSession {
    pub id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedPaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

/// Checkout session as returned by retrieve/list.
#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub customer_details: Option<StripeCustomerDetails>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct StripeCustomerDetails {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    pub status: String,
    pub receipt_email: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SessionList {
    data: Vec<StripeCheckoutSession>,
}

#[derive(Debug, Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: String,
    webhook_secret: String,
}

impl StripeClient {
    pub fn new(secret_key: &str, webhook_secret: &str) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.to_string(),
            webhook_secret: webhook_secret.to_string(),
        }
    }

    /// Create an embedded one-time-payment checkout session with ad-hoc
    /// price data from the catalog.
    pub async fn create_payment_session(
        &self,
        product: &Product,
        amount_cents: i64,
        customer_email: &str,
        metadata: &CheckoutMetadata,
        return_url: &str,
    ) -> Result<CreatedCheckoutSession> {
        let mut form: Vec<(String, String)> = vec![
            ("ui_mode".into(), "embedded".into()),
            ("mode".into(), "payment".into()),
            ("customer_email".into(), customer_email.into()),
            ("line_items[0][price_data][currency]".into(), "eur".into()),
            (
                "line_items[0][price_data][product_data][name]".into(),
                product.name.into(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                product.description.into(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                amount_cents.to_string(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            ("return_url".into(), return_url.into()),
        ];
        form.extend(metadata.form_fields("metadata"));

        self.post_form("/checkout/sessions", &form).await
    }

    /// Create an embedded subscription-mode checkout session using a
    /// dashboard-configured recurring Price ID, with a 24h free trial.
    /// Metadata goes on both the session and the subscription so either
    /// object can be traced back to the order.
    pub async fn create_subscription_session(
        &self,
        price_id: &str,
        customer_email: &str,
        metadata: &CheckoutMetadata,
        return_url: &str,
    ) -> Result<CreatedCheckoutSession> {
        let mut form: Vec<(String, String)> = vec![
            ("ui_mode".into(), "embedded".into()),
            ("mode".into(), "subscription".into()),
            ("customer_email".into(), customer_email.into()),
            ("line_items[0][price]".into(), price_id.into()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("subscription_data[trial_period_days]".into(), "1".into()),
            ("return_url".into(), return_url.into()),
        ];
        form.extend(metadata.form_fields("subscription_data[metadata]"));
        form.extend(metadata.form_fields("metadata"));

        self.post_form("/checkout/sessions", &form).await
    }

    /// Create a PaymentIntent for the custom payment-element flow.
    ///
    /// `statement_suffix` is truncated to Stripe's 22-char limit.
    pub async fn create_payment_intent(
        &self,
        amount_cents: i64,
        description: &str,
        statement_suffix: &str,
        receipt_email: &str,
        metadata: &CheckoutMetadata,
    ) -> Result<CreatedPaymentIntent> {
        let suffix: String = statement_suffix.chars().take(22).collect();

        let mut form: Vec<(String, String)> = vec![
            ("amount".into(), amount_cents.to_string()),
            ("currency".into(), "eur".into()),
            ("automatic_payment_methods[enabled]".into(), "true".into()),
            ("description".into(), description.into()),
            ("statement_descriptor_suffix".into(), suffix),
            ("receipt_email".into(), receipt_email.into()),
        ];
        form.extend(metadata.form_fields("metadata"));

        self.post_form("/payment_intents", &form).await
    }

    /// Retrieve a checkout session for status polling.
    pub async fn get_checkout_session(&self, session_id: &str) -> Result<StripeCheckoutSession> {
        self.get(&format!("/checkout/sessions/{}", session_id)).await
    }

    /// Retrieve a payment intent for status polling.
    pub async fn get_payment_intent(&self, intent_id: &str) -> Result<StripePaymentIntent> {
        self.get(&format!("/payment_intents/{}", intent_id)).await
    }

    /// Whether the email has at least one completed, paid checkout session.
    /// Used to gate the cancellation flow.
    pub async fn has_completed_session(&self, email: &str) -> Result<bool> {
        let sessions: SessionList = self
            .get_with_query(
                "/checkout/sessions",
                &[("customer_details[email]", email), ("limit", "100")],
            )
            .await?;

        Ok(sessions.data.iter().any(|s| {
            s.payment_status.as_deref() == Some("paid") && s.status.as_deref() == Some("complete")
        }))
    }

    async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        form: &[(String, String)],
    ) -> Result<T> {
        let response = self
            .client
            .post(format!("{}{}", STRIPE_API_BASE, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(form)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Stripe API error: {}", error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get_with_query(path, &[]).await
    }

    async fn get_with_query<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(format!("{}{}", STRIPE_API_BASE, path))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Stripe API error: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!("Stripe API error: {}", error_text)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Stripe response: {}", e)))
    }

    /// Maximum age of a webhook timestamp before it's rejected (in seconds).
    /// Stripe recommends 300 seconds (5 minutes).
    const WEBHOOK_TIMESTAMP_TOLERANCE_SECS: i64 = 300;

    pub fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<bool> {
        // Stripe signature format: t=timestamp,v1=signature
        let parts: Vec<&str> = signature.split(',').collect();

        let mut timestamp = None;
        let mut sig_v1 = None;

        for part in parts {
            if let Some(t) = part.strip_prefix("t=") {
                timestamp = Some(t);
            } else if let Some(s) = part.strip_prefix("v1=") {
                sig_v1 = Some(s);
            }
        }

        let timestamp_str =
            timestamp.ok_or_else(|| AppError::BadRequest(msg::INVALID_SIGNATURE_FORMAT.into()))?;
        let sig_v1 =
            sig_v1.ok_or_else(|| AppError::BadRequest(msg::INVALID_SIGNATURE_FORMAT.into()))?;

        // Parse and validate timestamp to prevent replay attacks.
        let timestamp: i64 = timestamp_str
            .parse()
            .map_err(|_| AppError::BadRequest(msg::INVALID_TIMESTAMP_IN_SIGNATURE.into()))?;

        let now = chrono::Utc::now().timestamp();
        let age = now - timestamp;

        if age > Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS {
            tracing::warn!(
                "Stripe webhook rejected: timestamp too old (age={}s, max={}s)",
                age,
                Self::WEBHOOK_TIMESTAMP_TOLERANCE_SECS
            );
            return Ok(false);
        }

        // Clock skew tolerance for timestamps from the future: 60 seconds
        if age < -60 {
            tracing::warn!(
                "Stripe webhook rejected: timestamp in the future (age={}s)",
                age
            );
            return Ok(false);
        }

        let signed_payload = format!("{}.{}", timestamp_str, String::from_utf8_lossy(payload));

        let mut mac = HmacSha256::new_from_slice(self.webhook_secret.as_bytes())
            .map_err(|_| AppError::Internal(msg::INVALID_WEBHOOK_SECRET.into()))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        // Constant-time comparison to prevent timing attacks.
        let expected_bytes = expected.as_bytes();
        let provided_bytes = sig_v1.as_bytes();

        // Length check is not constant-time, but signature length is not
        // secret (always 64 hex chars for SHA-256)
        if expected_bytes.len() != provided_bytes.len() {
            return Ok(false);
        }

        Ok(expected_bytes.ct_eq(provided_bytes).into())
    }
}

/// Generic Stripe webhook event - object is parsed based on event_type
#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}
