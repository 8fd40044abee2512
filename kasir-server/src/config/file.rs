//! TOML file configuration structures.
//!
//! These structs directly map to the `kasir-config.toml` file format.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub products: Vec<ProductConfig>,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Storefront origin for callback URLs when a request carries none.
    #[serde(default)]
    pub public_origin: Option<Url>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            public_origin: None,
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

/// Payment gateway section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub client_id: String,
    /// HMAC secret. Prefer the `KASIR_GATEWAY_SECRET_KEY` environment
    /// variable, which takes precedence.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Minutes until the hosted payment page expires.
    #[serde(default = "default_payment_due_date")]
    pub payment_due_date: u32,
    #[serde(default = "default_payment_method_types")]
    pub payment_method_types: Vec<String>,
    #[serde(default = "default_customer_country")]
    pub customer_country: String,
    /// Outbound request timeout, clamped to 10..=60 seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub verify_notifications: bool,
}

fn default_base_url() -> String {
    kasir_core::config::GatewayConfig::DEFAULT_BASE_URL.to_string()
}

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_payment_due_date() -> u32 {
    60
}

fn default_payment_method_types() -> Vec<String> {
    vec!["CREDIT_CARD".to_string()]
}

fn default_customer_country() -> String {
    "ID".to_string()
}

fn default_timeout_secs() -> u64 {
    kasir_core::config::GatewayConfig::DEFAULT_TIMEOUT.as_secs()
}

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub id: String,
    pub name: String,
    /// Whole rupiah.
    pub price: u64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}
