use axum::{extract::State, http::HeaderMap};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extractors::Json;
use crate::error::Result;
use crate::state::AppState;
use crate::util::extract_request_info;

/// Funnel tracking event from the storefront. Everything beyond `action`
/// is passed through to the sheet as-is: customer fields, product fields,
/// device info (MAC address, PIN key) for WhatsApp leads.
#[derive(Debug, Deserialize)]
pub struct TrackingRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(flatten)]
    pub data: serde_json::Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct TrackingResponse {
    pub success: bool,
    pub action: String,
}

/// Build the payload appended to the sheet: the client's fields enriched
/// with IP, user agent, and server receive time.
fn build_payload(
    action: &str,
    data: &serde_json::Map<String, Value>,
    headers: &HeaderMap,
) -> Value {
    let (ip, user_agent) = extract_request_info(headers);

    let mut payload = data.clone();
    payload.insert("action".into(), Value::String(action.to_string()));
    payload.insert(
        "ip".into(),
        Value::String(ip.unwrap_or_else(|| "unknown".into())),
    );
    payload.insert(
        "userAgent".into(),
        Value::String(user_agent.unwrap_or_else(|| "unknown".into())),
    );
    payload.insert(
        "receivedAt".into(),
        Value::String(Utc::now().to_rfc3339()),
    );

    Value::Object(payload)
}

/// POST /api/track-checkout and POST /api/track-whatsapp
///
/// Fire-and-forget lead logging: the event goes to the tracing log and,
/// when configured, to the Google-Sheets webhook. Failures never reach
/// the browser.
pub async fn track_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<TrackingRequest>,
) -> Result<Json<TrackingResponse>> {
    let action = request.action.unwrap_or_else(|| "unknown".to_string());
    let payload = build_payload(&action, &request.data, &headers);

    tracing::info!(action = %action, payload = %payload, "Tracking event");

    state.sheets.forward(&action, &payload).await;

    Ok(Json(TrackingResponse {
        success: true,
        action,
    }))
}
