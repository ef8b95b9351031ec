//! Shared application state.

use std::sync::Arc;

use crate::cancel::CancelTokenStore;
use crate::config::Config;
use crate::payments::StripeClient;
use crate::relay::{MetaClient, TikTokClient};
use crate::sheets::SheetClient;

/// State handed to every handler. Cheap to clone: clients share a
/// `reqwest::Client` connection pool internally, and the token store is
/// behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub base_url: String,
    pub stripe: StripeClient,
    pub meta: MetaClient,
    pub tiktok: TikTokClient,
    pub sheets: SheetClient,
    pub cancel_tokens: Arc<CancelTokenStore>,
    /// Stripe recurring Price IDs per catalog product.
    pub price_ids: PriceIds,
    pub whatsapp_number: Option<String>,
    pub dev_mode: bool,
}

/// Configured Stripe Price IDs, one per catalog product.
#[derive(Debug, Clone, Default)]
pub struct PriceIds {
    pub six_months_one_device: Option<String>,
    pub twelve_months_one_device: Option<String>,
    pub twelve_months_two_devices: Option<String>,
}

impl PriceIds {
    pub fn for_product(&self, product_id: &str) -> Option<&str> {
        match product_id {
            "6months-1device" => self.six_months_one_device.as_deref(),
            "12months-1device" => self.twelve_months_one_device.as_deref(),
            "12months-2devices" => self.twelve_months_two_devices.as_deref(),
            _ => None,
        }
    }
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            stripe: StripeClient::new(&config.stripe_secret_key, &config.stripe_webhook_secret),
            meta: MetaClient::new(config.meta_pixel_id.clone(), config.meta_access_token.clone()),
            tiktok: TikTokClient::new(
                config.tiktok_pixel_id.clone(),
                config.tiktok_access_token.clone(),
            ),
            sheets: SheetClient::new(config.sheet_webhook_url.clone()),
            cancel_tokens: Arc::new(CancelTokenStore::new()),
            price_ids: PriceIds {
                six_months_one_device: config.stripe_price_6m_1d.clone(),
                twelve_months_one_device: config.stripe_price_12m_1d.clone(),
                twelve_months_two_devices: config.stripe_price_12m_2d.clone(),
            },
            whatsapp_number: config.whatsapp_number.clone(),
            dev_mode: config.dev_mode,
        }
    }
}
