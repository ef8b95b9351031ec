//! The fixed product catalog.
//!
//! Pricing lives here, not in the client request: the client sends a product
//! ID and the server decides what Stripe is told to charge. Descriptions are
//! deliberately generic (no service branding) so they look sane on card
//! statements and in the Stripe dashboard.

/// A sellable subscription package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// One-time price in euro cents.
    pub amount_cents: i64,
}

const CATALOG: &[Product] = &[
    Product {
        id: "6months-1device",
        name: "6 Month Subscription",
        description: "Premium streaming subscription - 6 months, 1 device",
        amount_cents: 3900,
    },
    Product {
        id: "12months-1device",
        name: "12 Month Subscription",
        description: "Premium streaming subscription - 12 months, 1 device",
        amount_cents: 5900,
    },
    Product {
        id: "12months-2devices",
        name: "12 Month Subscription Duo",
        description: "Premium streaming subscription - 12 months, 2 devices",
        amount_cents: 7900,
    },
];

/// Generic fallback for unknown product IDs.
///
/// The storefront only ever sends catalog IDs, but a stale client or a
/// hand-crafted request still gets a sellable product rather than a 404.
const FALLBACK: Product = Product {
    id: "generic",
    name: "Premium Subscription",
    description: "Digital streaming subscription",
    amount_cents: 5900,
};

/// Look up a product by ID, falling back to the generic package.
pub fn get(product_id: &str) -> Product {
    CATALOG
        .iter()
        .find(|p| p.id == product_id)
        .copied()
        .unwrap_or(FALLBACK)
}

/// Checkout session mode, decided by price configuration and client intent.
/// Subscription mode carries the recurring Price ID it was chosen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutMode<'a> {
    /// One-time embedded payment with ad-hoc price data.
    Payment,
    /// Recurring subscription with a 24h trial, using a dashboard Price ID.
    Subscription(&'a str),
}

impl CheckoutMode<'_> {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckoutMode::Payment => "payment",
            CheckoutMode::Subscription(_) => "subscription",
        }
    }
}

/// Pick the checkout mode: subscription only when the client asked for it
/// AND a recurring Price ID is configured for the product. Everything else
/// falls back to a one-time payment.
pub fn checkout_mode(price_id: Option<&str>, use_subscription: bool) -> CheckoutMode<'_> {
    match (price_id, use_subscription) {
        (Some(price_id), true) => CheckoutMode::Subscription(price_id),
        _ => CheckoutMode::Payment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(get("6months-1device").amount_cents, 3900);
        assert_eq!(get("12months-1device").amount_cents, 5900);
        assert_eq!(get("12months-2devices").amount_cents, 7900);
    }

    #[test]
    fn test_unknown_product_falls_back_to_generic() {
        let p = get("no-such-product");
        assert_eq!(p.id, "generic");
        assert_eq!(p.name, "Premium Subscription");
        assert_eq!(p.amount_cents, 5900);
    }

    #[test]
    fn test_checkout_mode_selection() {
        // Subscription requires both a configured price and client opt-in,
        // and carries the price it was chosen for
        assert_eq!(
            checkout_mode(Some("price_123"), true),
            CheckoutMode::Subscription("price_123")
        );
        assert_eq!(checkout_mode(Some("price_123"), false), CheckoutMode::Payment);
        assert_eq!(checkout_mode(None, true), CheckoutMode::Payment);
        assert_eq!(checkout_mode(None, false), CheckoutMode::Payment);
    }

    #[test]
    fn test_mode_strings() {
        assert_eq!(CheckoutMode::Payment.as_str(), "payment");
        assert_eq!(CheckoutMode::Subscription("price_123").as_str(), "subscription");
    }
}
