use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::cancel::ConsumeError;
use crate::error::{msg, AppError, Result};
use crate::extractors::Json;
use crate::state::AppState;
use crate::util::looks_like_email;

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelRequestResponse {
    pub success: bool,
    pub message: &'static str,
    /// Dev mode only: the link that would have been emailed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _debug_link: Option<String>,
}

/// POST /api/cancel/request
///
/// Verifies the email has at least one completed Stripe payment, then
/// mints a single-use token with a 24h expiry and logs the cancellation
/// link. There is no mailer yet; support picks the link out of the logs.
pub async fn request_cancellation(
    State(state): State<AppState>,
    Json(request): Json<CancelRequest>,
) -> Result<Json<CancelRequestResponse>> {
    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest(msg::EMAIL_REQUIRED.into()))?;

    // Verify the customer actually paid before handing out a token
    let has_payment = state.stripe.has_completed_session(email).await?;
    if !has_payment {
        let message = if looks_like_email(email) {
            msg::NO_SUBSCRIPTION_FOUND
        } else {
            msg::INVALID_EMAIL
        };
        return Err(AppError::NotFound(message.into()));
    }

    let token = state.cancel_tokens.issue(email);

    let encoded_email: String = form_urlencoded::byte_serialize(email.as_bytes()).collect();
    let cancel_link = format!(
        "{}/cancel?token={}&email={}",
        state.base_url, token, encoded_email
    );

    // "Sending" is logging until an email provider is wired up
    tracing::info!(email, link = %cancel_link, "Cancellation link issued");

    Ok(Json(CancelRequestResponse {
        success: true,
        message: "Cancellation email sent",
        _debug_link: state.dev_mode.then_some(cancel_link),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CancelConfirmRequest {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CancelConfirmResponse {
    pub success: bool,
    pub message: &'static str,
}

/// POST /api/cancel/confirm
///
/// Consumes the token (single-use) and records the cancellation in the
/// logs. No subscription is cancelled against Stripe here; support acts
/// on the logged record.
pub async fn confirm_cancellation(
    State(state): State<AppState>,
    Json(request): Json<CancelConfirmRequest>,
) -> Result<Json<CancelConfirmResponse>> {
    let (token, email) = match (request.token.as_deref(), request.email.as_deref()) {
        (Some(token), Some(email)) if !token.is_empty() && !email.is_empty() => (token, email),
        _ => return Err(AppError::BadRequest(msg::INVALID_CANCEL_REQUEST.into())),
    };

    state
        .cancel_tokens
        .consume(token, email)
        .map_err(|e| match e {
            ConsumeError::NotFound => AppError::BadRequest(msg::INVALID_OR_EXPIRED_LINK.into()),
            ConsumeError::EmailMismatch => AppError::BadRequest(msg::EMAIL_MISMATCH.into()),
            ConsumeError::Expired => AppError::BadRequest(msg::LINK_EXPIRED.into()),
        })?;

    tracing::info!(
        email,
        reason = request.reason.as_deref().unwrap_or("No reason provided"),
        requested_at = %Utc::now().to_rfc3339(),
        "Cancellation confirmed"
    );

    Ok(Json(CancelConfirmResponse {
        success: true,
        message: "Cancellation confirmed",
    }))
}
