use std::env;

/// Per-IP rate limit settings (requests per minute).
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    pub strict_rpm: u32,
    pub standard_rpm: u32,
    pub relaxed_rpm: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            strict_rpm: 10,
            standard_rpm: 30,
            relaxed_rpm: 60,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Public base URL used for Stripe return URLs and cancellation links.
    pub base_url: String,
    pub stripe_secret_key: String,
    pub stripe_webhook_secret: String,
    /// Stripe recurring Price IDs per product, for subscription-mode checkout.
    pub stripe_price_6m_1d: Option<String>,
    pub stripe_price_12m_1d: Option<String>,
    pub stripe_price_12m_2d: Option<String>,
    pub meta_pixel_id: Option<String>,
    pub meta_access_token: Option<String>,
    pub tiktok_pixel_id: Option<String>,
    pub tiktok_access_token: Option<String>,
    /// Google-Sheets-backed webhook for lead logging (Apps Script web app).
    pub sheet_webhook_url: Option<String>,
    /// WhatsApp number for activation deep links, digits only (e.g. "33612345678").
    pub whatsapp_number: Option<String>,
    pub rate_limit: RateLimitConfig,
    pub dev_mode: bool,
}

/// Read an env var, treating empty and placeholder values as unset.
///
/// The deployment templates ship with values like "your_meta_access_token";
/// a pixel client must not try to use those.
fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.starts_with("your_"))
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let dev_mode = env::var("STREAMCART_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url =
            env::var("BASE_URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));

        let rate_limit = RateLimitConfig {
            strict_rpm: env_rpm("RATE_LIMIT_STRICT_RPM", 10),
            standard_rpm: env_rpm("RATE_LIMIT_STANDARD_RPM", 30),
            relaxed_rpm: env_rpm("RATE_LIMIT_RELAXED_RPM", 60),
        };

        Self {
            host,
            port,
            base_url,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
            stripe_price_6m_1d: env_opt("STRIPE_PRICE_6M_1D"),
            stripe_price_12m_1d: env_opt("STRIPE_PRICE_12M_1D"),
            stripe_price_12m_2d: env_opt("STRIPE_PRICE_12M_2D"),
            meta_pixel_id: env_opt("META_PIXEL_ID"),
            meta_access_token: env_opt("META_ACCESS_TOKEN"),
            tiktok_pixel_id: env_opt("TIKTOK_PIXEL_ID"),
            tiktok_access_token: env_opt("TIKTOK_ACCESS_TOKEN"),
            sheet_webhook_url: env_opt("SHEET_WEBHOOK_URL"),
            whatsapp_number: env_opt("WHATSAPP_NUMBER"),
            rate_limit,
            dev_mode,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_rpm(key: &str, default: u32) -> u32 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}
