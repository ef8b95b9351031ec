use axum::{extract::State, http::HeaderMap};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::extractors::Json;
use crate::relay::{ConversionEvent, RequestContext};
use crate::state::AppState;
use crate::util::extract_request_info;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    pub success: bool,
    /// The shared deduplication ID actually used, echoed so the client can
    /// confirm it matches what its browser pixels reported.
    pub event_id: String,
    pub meta: bool,
    pub tiktok: bool,
}

/// POST /api/track-conversion
///
/// Fans the event out to Meta's and TikTok's server-side APIs concurrently
/// with one shared event ID and joins both results. The legs are
/// independent: one failing does not affect the other, and neither
/// failure is surfaced as an error.
pub async fn track_conversion(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(event): Json<ConversionEvent>,
) -> Result<Json<ConversionResponse>> {
    // Same ID goes to both platforms; generate one if the client didn't
    let event_id = event
        .event_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let (client_ip, user_agent) = extract_request_info(&headers);
    let ctx = RequestContext {
        client_ip,
        user_agent,
    };

    let (meta_sent, tiktok_sent) = tokio::join!(
        state.meta.send_event(&event, &event_id, &ctx),
        state.tiktok.send_event(&event, &event_id, &ctx),
    );

    tracing::info!(
        event_id = %event_id,
        event_name = %event.event_name,
        meta = meta_sent,
        tiktok = tiktok_sent,
        "Conversion event relayed"
    );

    Ok(Json(ConversionResponse {
        success: true,
        event_id,
        meta: meta_sent,
        tiktok: tiktok_sent,
    }))
}
