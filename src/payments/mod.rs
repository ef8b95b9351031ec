mod stripe;

pub use stripe::{
    CheckoutMetadata, CreatedCheckoutSession, CreatedPaymentIntent, StripeCheckoutSession,
    StripeClient, StripeCustomerDetails, StripePaymentIntent, StripeWebhookEvent,
};
