//! Shared utility functions for the Streamcart application.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Hash a PII value the way Meta and TikTok both require:
/// SHA-256 over the lowercased, trimmed input, hex-encoded.
pub fn hash_pii(value: &str) -> String {
    let normalized = value.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}

/// Extract client IP address and user-agent from request headers.
///
/// Tries `x-forwarded-for` first (for proxied requests), then `x-real-ip`.
/// Only the first hop of a forwarded chain is kept.
pub fn extract_request_info(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(String::from)
        })
        .filter(|v| !v.is_empty());

    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    (ip, user_agent)
}

/// Loose email shape check, used only to pick an error message.
/// Real validation is Stripe's job.
pub fn looks_like_email(value: &str) -> bool {
    value.contains('@')
}
