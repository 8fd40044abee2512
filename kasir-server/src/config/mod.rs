//! Configuration module for kasir-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments and
//! environment variables, and validates it into the runtime types from
//! [`kasir_core::config`].

pub mod file;

use crate::config::file::{FileConfig, GatewayConfig as FileGatewayConfig, ProductConfig};
use kasir_core::config::{CatalogConfig, GatewayConfig, ServerConfig, SharedConfig};
use kasir_sdk::objects::Product;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable that overrides `gateway.secret_key`.
pub const SECRET_KEY_ENV: &str = "KASIR_GATEWAY_SECRET_KEY";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
#[derive(Debug)]
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub catalog: CatalogConfig,
}

impl LoadedConfig {
    /// Convert into a SharedConfig with Arc<RwLock<T>> wrappers.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.server, self.gateway, self.catalog)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and validate the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI and environment overrides
    /// 3. Validate and build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        let secret_override = std::env::var(SECRET_KEY_ENV).ok().filter(|s| !s.is_empty());
        build_loaded_config(file_config, secret_override)
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

/// Validate `file_config` and convert it into runtime configuration.
///
/// `secret_override` wins over `gateway.secret_key` when present.
pub fn build_loaded_config(
    file_config: FileConfig,
    secret_override: Option<String>,
) -> Result<LoadedConfig, ConfigError> {
    if let Some(origin) = &file_config.server.public_origin {
        ensure_http(origin, "server.public_origin")?;
    }

    Ok(LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
            public_origin: file_config.server.public_origin,
        },
        gateway: convert_gateway(file_config.gateway, secret_override)?,
        catalog: convert_catalog(file_config.products)?,
    })
}

fn ensure_http(url: &Url, field: &str) -> Result<(), ConfigError> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::ValidationError(format!(
            "{field} must be an http(s) URL, got scheme {other:?}"
        ))),
    }
}

fn convert_gateway(
    g: FileGatewayConfig,
    secret_override: Option<String>,
) -> Result<GatewayConfig, ConfigError> {
    let client_id = g.client_id.trim().to_string();
    if client_id.is_empty() {
        return Err(ConfigError::ValidationError(
            "gateway.client_id must not be empty".into(),
        ));
    }

    let base_url = Url::parse(&g.base_url).map_err(|e| {
        ConfigError::ValidationError(format!("gateway.base_url {:?}: {e}", g.base_url))
    })?;
    ensure_http(&base_url, "gateway.base_url")?;

    if g.payment_method_types.is_empty() {
        return Err(ConfigError::ValidationError(
            "gateway.payment_method_types must list at least one method".into(),
        ));
    }

    let requested = Duration::from_secs(g.timeout_secs);
    let timeout = requested.clamp(GatewayConfig::MIN_TIMEOUT, GatewayConfig::MAX_TIMEOUT);
    if timeout != requested {
        tracing::warn!(
            requested_secs = g.timeout_secs,
            effective_secs = timeout.as_secs(),
            "gateway.timeout_secs out of range, clamped"
        );
    }

    let secret = secret_override.or(g.secret_key).unwrap_or_default();
    if secret.is_empty() {
        tracing::warn!(
            "no gateway secret key configured (set {SECRET_KEY_ENV}); checkout requests will be rejected by the gateway"
        );
    }

    Ok(GatewayConfig {
        client_id,
        secret: secret.into_bytes().into_boxed_slice(),
        base_url,
        currency: g.currency,
        payment_due_date: g.payment_due_date,
        payment_method_types: g.payment_method_types,
        customer_country: g.customer_country,
        timeout,
        verify_notifications: g.verify_notifications,
    })
}

fn convert_catalog(products: Vec<ProductConfig>) -> Result<CatalogConfig, ConfigError> {
    let mut seen = HashSet::new();
    for p in &products {
        if p.id.trim().is_empty() || p.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "products need a non-empty id and name".into(),
            ));
        }
        if p.price == 0 {
            return Err(ConfigError::ValidationError(format!(
                "product {} has a zero price",
                p.id
            )));
        }
        if !seen.insert(p.id.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate product id {}",
                p.id
            )));
        }
    }

    Ok(CatalogConfig::new(
        products
            .into_iter()
            .map(|p| Product {
                id: p.id,
                name: p.name,
                price: p.price,
                description: p.description,
                image: p.image,
            })
            .collect(),
    ))
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
