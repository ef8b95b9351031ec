//! Per-IP rate limiting for the public API.
//!
//! Every endpoint that reaches Stripe gets the strict tier so a single
//! client cannot burn API quota; polling and tracking endpoints get the
//! standard tier; /health is relaxed. The webhook receiver is left
//! unthrottled because Stripe retries on 429 and signs every request.
//!
//! Per-minute budgets come from RATE_LIMIT_{STRICT,STANDARD,RELAXED}_RPM.

use std::sync::Arc;
use std::time::Duration;

use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::GovernorLayer;

use crate::config::RateLimitConfig;

pub type RateLimitLayer = GovernorLayer<
    tower_governor::key_extractor::PeerIpKeyExtractor,
    governor::middleware::NoOpMiddleware<governor::clock::QuantaInstant>,
>;

/// Rate-limit tier of an endpoint group.
#[derive(Debug, Clone, Copy)]
pub enum Tier {
    /// Endpoints that trigger Stripe API calls.
    Strict,
    /// Status polling, lead tracking, conversion relay.
    Standard,
    /// Health checks.
    Relaxed,
}

impl Tier {
    fn rpm(self, limits: &RateLimitConfig) -> u32 {
        match self {
            Tier::Strict => limits.strict_rpm,
            Tier::Standard => limits.standard_rpm,
            Tier::Relaxed => limits.relaxed_rpm,
        }
    }

    /// Build the per-IP governor layer for this tier.
    pub fn layer(self, limits: &RateLimitConfig) -> RateLimitLayer {
        let requests_per_minute = self.rpm(limits);
        assert!(requests_per_minute > 0, "Rate limit must be greater than 0");

        let period_secs = (60 / requests_per_minute as u64).max(1);
        let config = GovernorConfigBuilder::default()
            .period(Duration::from_secs(period_secs))
            .burst_size(requests_per_minute)
            .finish()
            .expect("Failed to build rate limiter config");

        GovernorLayer {
            config: Arc::new(config),
        }
    }
}
