//! Server-side conversion relay.
//!
//! A purchase is reported three ways with one shared event ID: the browser
//! Meta pixel, the browser TikTok pixel, and this relay, which forwards the
//! same event to both platforms' server-side APIs. The shared ID lets each
//! platform collapse its browser-reported and server-reported copy into a
//! single attributed conversion.
//!
//! The relay is deliberately stateless: no retry, no queueing, no
//! dead-lettering. A dropped marketing event is not worth the machinery.

mod meta;
mod tiktok;

pub use meta::MetaClient;
pub use tiktok::TikTokClient;

use serde::Deserialize;

/// A conversion event as constructed per purchase, forwarded unmodified
/// (beyond PII hashing) to both platforms.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionEvent {
    pub event_name: String,
    /// Shared event ID for cross-platform deduplication. Generated
    /// server-side when the client did not supply one.
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub content_id: Option<String>,
    #[serde(default)]
    pub content_name: Option<String>,
    #[serde(default)]
    pub event_source_url: Option<String>,
    /// TikTok click ID, carried from the landing URL for attribution.
    #[serde(default)]
    pub ttclid: Option<String>,
    /// Facebook click ID, carried from the landing URL for attribution.
    #[serde(default)]
    pub fbclid: Option<String>,
}

/// Request context forwarded alongside the event for attribution matching.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
}
