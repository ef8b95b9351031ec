use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Error message constants shared across handlers.
///
/// Keeping the user-visible strings in one place means tests can assert on
/// them without chasing format strings through the handlers.
pub mod msg {
    pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";
    pub const MISSING_SESSION_OR_INTENT: &str = "Missing session_id or payment_intent";
    pub const EMAIL_REQUIRED: &str = "Email is required";
    pub const INVALID_EMAIL: &str = "Invalid email";
    pub const NO_SUBSCRIPTION_FOUND: &str = "No subscription found for this email";
    pub const INVALID_CANCEL_REQUEST: &str = "Invalid request";
    pub const INVALID_OR_EXPIRED_LINK: &str = "Invalid or expired link";
    pub const EMAIL_MISMATCH: &str = "Email mismatch";
    pub const LINK_EXPIRED: &str = "Link has expired";
    pub const MISSING_SIGNATURE: &str = "Missing stripe-signature header";
    pub const INVALID_SIGNATURE: &str = "Invalid signature";
    pub const INVALID_SIGNATURE_FORMAT: &str = "Invalid signature format";
    pub const INVALID_TIMESTAMP_IN_SIGNATURE: &str = "Invalid timestamp in signature";
    pub const INVALID_WEBHOOK_SECRET: &str = "Invalid webhook secret";
    pub const WHATSAPP_NOT_CONFIGURED: &str = "WhatsApp contact is not configured";
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Json(e) => {
                tracing::error!("JSON error: {}", e);
                (StatusCode::BAD_REQUEST, "Invalid JSON", Some(e.to_string()))
            }
            AppError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Extension trait for converting `Option<T>` into handler errors.
pub trait OptionExt<T> {
    fn or_not_found(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_found(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| AppError::NotFound(msg.into()))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
