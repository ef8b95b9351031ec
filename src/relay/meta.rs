//! Meta Conversions API client.

use reqwest::Client;
use serde_json::json;

use crate::util::hash_pii;

use super::{ConversionEvent, RequestContext};

const GRAPH_API_BASE: &str = "https://graph.facebook.com/v18.0";

#[derive(Debug, Clone)]
pub struct MetaClient {
    client: Client,
    pixel_id: Option<String>,
    access_token: Option<String>,
}

impl MetaClient {
    pub fn new(pixel_id: Option<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            pixel_id,
            access_token,
        }
    }

    /// Whether this client has credentials and will actually send events.
    pub fn is_configured(&self) -> bool {
        self.pixel_id.is_some() && self.access_token.is_some()
    }

    /// Build the Conversions API payload for an event.
    ///
    /// Email and phone are SHA-256 hashed as the API requires; IP, user
    /// agent, and the fbc click ID go in clear for attribution matching.
    pub fn build_payload(
        &self,
        event: &ConversionEvent,
        event_id: &str,
        ctx: &RequestContext,
        event_time: i64,
    ) -> serde_json::Value {
        let mut user_data = serde_json::Map::new();
        if let Some(ref email) = event.email {
            user_data.insert("em".into(), json!([hash_pii(email)]));
        }
        if let Some(ref phone) = event.phone {
            user_data.insert("ph".into(), json!([hash_pii(phone)]));
        }
        if let Some(ref ip) = ctx.client_ip {
            user_data.insert("client_ip_address".into(), json!(ip));
        }
        if let Some(ref ua) = ctx.user_agent {
            user_data.insert("client_user_agent".into(), json!(ua));
        }
        if let Some(ref fbclid) = event.fbclid {
            user_data.insert("fbc".into(), json!(fbclid));
        }

        json!({
            "data": [{
                "event_name": event.event_name,
                "event_time": event_time,
                "event_id": event_id,
                "action_source": "website",
                "event_source_url": event.event_source_url,
                "user_data": user_data,
                "custom_data": {
                    "currency": event.currency.as_deref().unwrap_or("EUR"),
                    "value": event.value,
                    "content_ids": event.content_id.as_ref().map(|id| vec![id.clone()]),
                    "content_name": event.content_name,
                },
            }]
        })
    }

    /// Send an event. Returns true if the platform accepted it, false when
    /// unconfigured or on failure (logged, never propagated).
    pub async fn send_event(
        &self,
        event: &ConversionEvent,
        event_id: &str,
        ctx: &RequestContext,
    ) -> bool {
        let (Some(pixel_id), Some(access_token)) = (&self.pixel_id, &self.access_token) else {
            tracing::debug!("Meta Conversions API: not configured, skipping");
            return false;
        };

        let payload = self.build_payload(event, event_id, ctx, chrono::Utc::now().timestamp());

        let result = self
            .client
            .post(format!("{}/{}/events", GRAPH_API_BASE, pixel_id))
            .query(&[("access_token", access_token.as_str())])
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(event_id, "Meta Conversions API: event accepted");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(event_id, %status, body, "Meta Conversions API: rejected");
                false
            }
            Err(e) => {
                tracing::warn!(event_id, error = %e, "Meta Conversions API: request failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase_event() -> ConversionEvent {
        ConversionEvent {
            event_name: "Purchase".into(),
            event_id: Some("evt-1".into()),
            email: Some("Customer@Example.com".into()),
            phone: Some("+33 6 12 34 56 78".into()),
            value: Some(59.0),
            currency: None,
            content_id: Some("12months-1device".into()),
            content_name: Some("12 Month Subscription".into()),
            event_source_url: Some("https://shop.example/checkout/success".into()),
            ttclid: None,
            fbclid: Some("fb.1.123.abc".into()),
        }
    }

    #[test]
    fn test_payload_hashes_pii_and_carries_event_id() {
        let client = MetaClient::new(Some("px".into()), Some("tok".into()));
        let ctx = RequestContext {
            client_ip: Some("203.0.113.7".into()),
            user_agent: Some("test-agent".into()),
        };
        let payload = client.build_payload(&purchase_event(), "evt-1", &ctx, 1_700_000_000);

        let data = &payload["data"][0];
        assert_eq!(data["event_id"], "evt-1");
        assert_eq!(data["event_name"], "Purchase");
        assert_eq!(data["action_source"], "website");

        // Hashed, normalized PII
        let em = data["user_data"]["em"][0].as_str().unwrap();
        assert_eq!(em, hash_pii("customer@example.com"));
        assert_ne!(em, "Customer@Example.com");

        // Clear-text attribution context
        assert_eq!(data["user_data"]["client_ip_address"], "203.0.113.7");
        assert_eq!(data["user_data"]["fbc"], "fb.1.123.abc");

        // Currency defaults to EUR
        assert_eq!(data["custom_data"]["currency"], "EUR");
        assert_eq!(data["custom_data"]["content_ids"][0], "12months-1device");
    }

    #[test]
    fn test_unconfigured_client_reports_not_configured() {
        assert!(!MetaClient::new(None, Some("tok".into())).is_configured());
        assert!(!MetaClient::new(Some("px".into()), None).is_configured());
        assert!(MetaClient::new(Some("px".into()), Some("tok".into())).is_configured());
    }
}
