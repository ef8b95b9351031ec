//! Streamcart - checkout and conversion-tracking backend for a streaming
//! subscription storefront.
//!
//! This library provides the core functionality for the storefront API:
//! Stripe checkout, the self-service cancellation flow, conversion-event
//! relay to ad platforms, and lead tracking.

pub mod cancel;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod payments;
pub mod products;
pub mod rate_limit;
pub mod relay;
pub mod sheets;
pub mod state;
pub mod util;
pub mod whatsapp;
