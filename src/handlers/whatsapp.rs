use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::error::{msg, OptionExt, Result};
use crate::extractors::{Json, Query};
use crate::products;
use crate::state::AppState;
use crate::whatsapp;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppLinkQuery {
    #[serde(default)]
    pub product_id: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub pin_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WhatsAppLinkResponse {
    pub link: String,
}

/// GET /api/whatsapp-link
///
/// Builds the wa.me activation link the success page shows after payment.
/// 404 when no WhatsApp number is configured for the deployment.
pub async fn whatsapp_link(
    State(state): State<AppState>,
    Query(query): Query<WhatsAppLinkQuery>,
) -> Result<Json<WhatsAppLinkResponse>> {
    let number = state
        .whatsapp_number
        .as_deref()
        .or_not_found(msg::WHATSAPP_NOT_CONFIGURED)?;

    let product = products::get(query.product_id.as_deref().unwrap_or_default());
    let message = whatsapp::activation_message(
        product.name,
        query.customer_name.as_deref().unwrap_or("customer"),
        query.mac_address.as_deref(),
        query.pin_key.as_deref(),
    );

    Ok(Json(WhatsAppLinkResponse {
        link: whatsapp::deep_link(number, &message),
    }))
}
