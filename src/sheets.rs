//! Lead-tracking relay to a Google-Sheets-backed webhook.
//!
//! The storefront posts funnel events (form started, form abandoned,
//! checkout completed, whatsapp click) which are appended to a spreadsheet
//! by a Google Apps Script web app. Delivery is best-effort: failures are
//! logged and swallowed, never surfaced to the browser.

use reqwest::Client;
use serde::Serialize;

/// Sheet client. When no webhook URL is configured the client logs the
/// event and does nothing else.
#[derive(Debug, Clone)]
pub struct SheetClient {
    client: Client,
    webhook_url: Option<String>,
}

impl SheetClient {
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// POST a tracking payload to the sheet webhook. Returns whether the
    /// webhook accepted it; unconfigured counts as "not forwarded".
    pub async fn forward<T: Serialize>(&self, action: &str, payload: &T) -> bool {
        let Some(ref webhook_url) = self.webhook_url else {
            tracing::debug!(action, "Sheet webhook not configured, event logged only");
            return false;
        };

        let result = self
            .client
            .post(webhook_url)
            .json(payload)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!(action, "Tracking event forwarded to sheet webhook");
                true
            }
            Ok(response) => {
                tracing::warn!(
                    action,
                    status = %response.status(),
                    "Sheet webhook rejected tracking event"
                );
                false
            }
            Err(e) => {
                tracing::warn!(action, error = %e, "Sheet webhook call failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_configured() {
        assert!(!SheetClient::new(None).is_configured());
        assert!(SheetClient::new(Some("https://script.google.com/macros/s/x/exec".into()))
            .is_configured());
    }

    #[tokio::test]
    async fn test_unconfigured_forward_is_a_no_op() {
        let client = SheetClient::new(None);
        assert!(!client.is_configured());
        assert!(!client.forward("form_started", &json!({ "a": 1 })).await);
    }
}
