//! Payment gateway configuration.

use std::time::Duration;
use url::Url;

/// Credentials and checkout defaults for the hosted payment gateway.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Merchant client id, sent as `Client-Id`.
    pub client_id: String,
    /// HMAC secret. May be empty; requests are then signed with an empty
    /// key and rejected by the gateway.
    pub secret: Box<[u8]>,
    pub base_url: Url,
    /// ISO 4217 code sent with every order.
    pub currency: String,
    /// Minutes until the hosted payment page expires.
    pub payment_due_date: u32,
    pub payment_method_types: Vec<String>,
    /// Country code sent in the customer block.
    pub customer_country: String,
    pub timeout: Duration,
    /// Require a valid `Signature` header on inbound notifications.
    pub verify_notifications: bool,
}

impl GatewayConfig {
    pub const DEFAULT_BASE_URL: &'static str = "https://api-sandbox.doku.com";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    pub const MIN_TIMEOUT: Duration = Duration::from_secs(10);
    pub const MAX_TIMEOUT: Duration = Duration::from_secs(60);

    /// Get the secret key bytes for HMAC signing.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }

    pub fn has_secret(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("currency", &self.currency)
            .field("payment_due_date", &self.payment_due_date)
            .field("payment_method_types", &self.payment_method_types)
            .field("customer_country", &self.customer_country)
            .field("timeout", &self.timeout)
            .field("verify_notifications", &self.verify_notifications)
            .finish()
    }
}
