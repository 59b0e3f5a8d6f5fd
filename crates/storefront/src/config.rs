//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_API_URL` - Base URL of the catalog API serving `/stock/{id}` and `/products/{id}`
//!
//! ## Optional
//! - `STOREFRONT_API_TOKEN` - Bearer token sent to the catalog API
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_DATA_DIR` - Directory the cart is persisted in (default: data)
//! - `STOREFRONT_CART_KEY` - Storage key for the cart (default: @RocketShoes:cart)
//! - `STOREFRONT_STRICT_STOCK` - Check stock for the first unit of a new item too (default: false)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::services::{CartSettings, DEFAULT_STORAGE_KEY, StockPolicy};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog API configuration
    pub catalog: CatalogConfig,
    /// Directory holding the persisted cart
    pub data_dir: PathBuf,
    /// Cart store settings
    pub cart: CartSettings,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Catalog API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Base URL; stock and product paths are resolved against it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl CatalogConfig {
    /// Create a catalog configuration without a token.
    #[must_use]
    pub const fn new(base_url: Url) -> Self {
        Self {
            base_url,
            api_token: None,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from a variable lookup.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = or_default(&var, "STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| invalid("STOREFRONT_HOST", &e))?;
        let port = or_default(&var, "STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| invalid("STOREFRONT_PORT", &e))?;

        let base_url = required(&var, "STOREFRONT_API_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| invalid("STOREFRONT_API_URL", &e))?;
        let catalog = CatalogConfig {
            base_url,
            api_token: var("STOREFRONT_API_TOKEN")
                .filter(|token| !token.is_empty())
                .map(SecretString::from),
        };

        let data_dir = PathBuf::from(or_default(&var, "STOREFRONT_DATA_DIR", "data"));
        let strict = parse_bool(&or_default(&var, "STOREFRONT_STRICT_STOCK", "false"))
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "STOREFRONT_STRICT_STOCK".to_string(),
                    "expected true or false".to_string(),
                )
            })?;
        let cart = CartSettings {
            storage_key: or_default(&var, "STOREFRONT_CART_KEY", DEFAULT_STORAGE_KEY),
            stock_policy: if strict {
                StockPolicy::Strict
            } else {
                StockPolicy::Lenient
            },
        };

        Ok(Self {
            host,
            port,
            catalog,
            data_dir,
            cart,
            sentry_dsn: var("SENTRY_DSN"),
            sentry_environment: var("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required variable.
fn required(var: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    var(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a variable with a default value.
fn or_default(var: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

fn invalid(key: &str, err: &impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), err.to_string())
}

/// Parse a boolean flag.
fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
