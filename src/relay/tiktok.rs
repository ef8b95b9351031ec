//! TikTok Events API client.

use reqwest::Client;
use serde_json::json;

use crate::util::hash_pii;

use super::{ConversionEvent, RequestContext};

const EVENTS_API_URL: &str = "https://business-api.tiktok.com/open_api/v1.3/event/track/";

/// TikTok has its own vocabulary for standard events; a Meta-style
/// "Purchase" is a "CompletePayment" there. Other names pass through.
pub fn map_event_name(name: &str) -> &str {
    match name {
        "Purchase" => "CompletePayment",
        other => other,
    }
}

#[derive(Debug, Clone)]
pub struct TikTokClient {
    client: Client,
    pixel_id: Option<String>,
    access_token: Option<String>,
}

impl TikTokClient {
    pub fn new(pixel_id: Option<String>, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            pixel_id,
            access_token,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.pixel_id.is_some() && self.access_token.is_some()
    }

    /// Build the Events API request body for an event.
    pub fn build_payload(
        &self,
        pixel_id: &str,
        event: &ConversionEvent,
        event_id: &str,
        ctx: &RequestContext,
        event_time: i64,
    ) -> serde_json::Value {
        let mut user = serde_json::Map::new();
        if let Some(ref email) = event.email {
            user.insert("email".into(), json!(hash_pii(email)));
        }
        if let Some(ref phone) = event.phone {
            user.insert("phone".into(), json!(hash_pii(phone)));
        }
        if let Some(ref ip) = ctx.client_ip {
            user.insert("ip".into(), json!(ip));
        }
        if let Some(ref ua) = ctx.user_agent {
            user.insert("user_agent".into(), json!(ua));
        }
        // Click ID for attribution, when the landing URL carried one
        if let Some(ref ttclid) = event.ttclid {
            user.insert("ttclid".into(), json!(ttclid));
        }

        json!({
            "event_source": "web",
            "event_source_id": pixel_id,
            "data": [{
                "event": map_event_name(&event.event_name),
                "event_id": event_id,
                "event_time": event_time,
                "user": user,
                "properties": {
                    "currency": event.currency.as_deref().unwrap_or("EUR"),
                    "value": event.value,
                    "contents": [{
                        "content_id": event.content_id,
                        "content_type": "product",
                        "content_name": event.content_name,
                        "content_category": "Subscription",
                        "price": event.value,
                        "num_items": 1,
                    }],
                },
                "page": {
                    "url": event.event_source_url,
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
            tracing::debug!("TikTok Events API: not configured, skipping");
            return false;
        };

        let payload =
            self.build_payload(pixel_id, event, event_id, ctx, chrono::Utc::now().timestamp());

        let result = self
            .client
            .post(EVENTS_API_URL)
            .header("Access-Token", access_token)
            .json(&payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(event_id, "TikTok Events API: event accepted");
                true
            }
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(event_id, %status, body, "TikTok Events API: rejected");
                false
            }
            Err(e) => {
                tracing::warn!(event_id, error = %e, "TikTok Events API: request failed");
                false
            }
        }
    }
}
