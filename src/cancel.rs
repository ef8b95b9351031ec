//! In-memory store for single-use cancellation tokens.
//!
//! Tokens are minted when a customer with a completed payment asks to
//! cancel, embedded in a link, and consumed exactly once on confirm.
//! The store is process-local and lost on restart; a customer whose link
//! stopped working just requests a new one.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

/// How long a cancellation link stays valid.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
struct TokenEntry {
    email: String,
    expires_at: i64,
}

/// Why a confirm attempt was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeError {
    /// Token was never issued, already used, or swept.
    NotFound,
    /// Token exists but was issued for a different email.
    EmailMismatch,
    /// Token existed but its 24h window has passed. The token is removed.
    Expired,
}

/// Process-local map of outstanding cancellation tokens.
///
/// A `Mutex` serializes access; contention is negligible at this traffic
/// level and the critical sections are a single map operation.
#[derive(Debug, Default)]
pub struct CancelTokenStore {
    tokens: Mutex<HashMap<String, TokenEntry>>,
}

impl CancelTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh token for `email` with the standard 24h expiry.
    pub fn issue(&self, email: &str) -> String {
        self.issue_with_expiry(email, Utc::now().timestamp() + TOKEN_TTL_SECS)
    }

    /// Mint a token with an explicit expiry timestamp. Exposed for tests.
    pub fn issue_with_expiry(&self, email: &str, expires_at: i64) -> String {
        let token = Uuid::new_v4().to_string();
        let mut tokens = self.tokens.lock().expect("cancel token lock poisoned");
        tokens.insert(
            token.clone(),
            TokenEntry {
                email: email.to_string(),
                expires_at,
            },
        );
        token
    }

    /// Validate and consume a token. On success the token is removed, so a
    /// second confirm with the same token fails with `NotFound`.
    ///
    /// An email mismatch does NOT consume the token: the legitimate holder
    /// of the link can still use it.
    pub fn consume(&self, token: &str, email: &str) -> Result<(), ConsumeError> {
        let mut tokens = self.tokens.lock().expect("cancel token lock poisoned");

        let entry = tokens.get(token).ok_or(ConsumeError::NotFound)?;

        if entry.email != email {
            return Err(ConsumeError::EmailMismatch);
        }

        if Utc::now().timestamp() > entry.expires_at {
            tokens.remove(token);
            return Err(ConsumeError::Expired);
        }

        tokens.remove(token);
        Ok(())
    }

    /// Drop all expired tokens. Called by the background sweep so the map
    /// cannot grow without bound from links that were never clicked.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let mut tokens = self.tokens.lock().expect("cancel token lock poisoned");
        let before = tokens.len();
        tokens.retain(|_, entry| entry.expires_at >= now);
        before - tokens.len()
    }

    /// Number of outstanding tokens, expired or not.
    pub fn len(&self) -> usize {
        self.tokens.lock().expect("cancel token lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spawns a background task that periodically sweeps expired cancellation
/// tokens. Runs every 5 minutes.
pub fn spawn_purge_task(store: std::sync::Arc<CancelTokenStore>) {
    tokio::spawn(async move {
        let interval = Duration::from_secs(5 * 60);

        loop {
            tokio::time::sleep(interval).await;

            let purged = store.purge_expired();
            if purged > 0 {
                tracing::debug!("Purged {} expired cancellation tokens", purged);
            }
        }
    });

    tracing::info!("Cancellation token purge task started (runs every 5 minutes)");
}
