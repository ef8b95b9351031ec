//! WhatsApp deep-link building for the post-purchase activation flow.
//!
//! IPTV apps are provisioned manually: after paying, the customer sends
//! their device's MAC address and PIN key over WhatsApp. The success page
//! links to `wa.me` with the message prefilled so support gets everything
//! in one tap.

use url::form_urlencoded;

/// Build a `wa.me` deep link with a prefilled text message.
pub fn deep_link(number: &str, message: &str) -> String {
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/{}?text={}", number, text)
}

/// Prefilled activation message for a completed purchase.
///
/// MAC and PIN are optional; the customer may not have them at hand yet,
/// in which case support asks for them in the chat.
pub fn activation_message(
    product_name: &str,
    customer_name: &str,
    mac_address: Option<&str>,
    pin_key: Option<&str>,
) -> String {
    let mut message = format!(
        "Hello, I just purchased {} (name: {}). I'd like to activate my subscription.",
        product_name, customer_name
    );
    if let Some(mac) = mac_address {
        message.push_str(&format!("\nMAC address: {}", mac));
    }
    if let Some(pin) = pin_key {
        message.push_str(&format!("\nPIN key: {}", pin));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link_encodes_message() {
        let link = deep_link("33612345678", "Hello, I need help & support");
        assert!(link.starts_with("https://wa.me/33612345678?text="));
        assert!(!link.contains(' '));
        assert!(!link.contains('&') || link.contains("%26"));
    }

    #[test]
    fn test_activation_message_includes_device_info() {
        let msg = activation_message(
            "12 Month Subscription",
            "Jane",
            Some("AA:BB:CC:DD:EE:FF"),
            Some("1234"),
        );
        assert!(msg.contains("12 Month Subscription"));
        assert!(msg.contains("MAC address: AA:BB:CC:DD:EE:FF"));
        assert!(msg.contains("PIN key: 1234"));
    }

    #[test]
    fn test_activation_message_without_device_info() {
        let msg = activation_message("6 Month Subscription", "Jane", None, None);
        assert!(!msg.contains("MAC address"));
        assert!(!msg.contains("PIN key"));
    }
}
