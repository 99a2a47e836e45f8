//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ROCKETSHOES_API_URL` - Inventory service base URL (default: `http://localhost:3333`)
//! - `ROCKETSHOES_API_TOKEN` - Bearer token for the inventory service
//! - `ROCKETSHOES_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `ROCKETSHOES_PRODUCT_CACHE_TTL_SECS` - Product metadata cache TTL, 0 disables (default: 300)
//! - `ROCKETSHOES_STORAGE_PATH` - Local key-value file holding the cart (default: `rocketshoes-storage.json`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_STORAGE_PATH: &str = "rocketshoes-storage.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Inventory/catalog HTTP service configuration
    pub inventory: InventoryConfig,
    /// Path of the local key-value file
    pub storage_path: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Inventory service configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct InventoryConfig {
    /// Base URL, always ending in `/` so endpoint paths join under it
    pub base_url: Url,
    /// Optional bearer token
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long product metadata stays cached; `None` disables the cache
    pub product_cache_ttl: Option<Duration>,
}

impl std::fmt::Debug for InventoryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("product_cache_ttl", &self.product_cache_ttl)
            .finish()
    }
}

impl InventoryConfig {
    /// Configuration pointing at `base_url` with default timeouts and caching.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("ROCKETSHOES_API_URL", base_url)?,
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            product_cache_ttl: Some(Duration::from_secs(DEFAULT_PRODUCT_CACHE_TTL_SECS)),
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let base_url = parse_base_url(
            "ROCKETSHOES_API_URL",
            &env.or_default("ROCKETSHOES_API_URL", DEFAULT_API_URL),
        )?;
        let api_token = env
            .optional("ROCKETSHOES_API_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);
        let timeout_secs = env.parse_or("ROCKETSHOES_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ROCKETSHOES_API_TIMEOUT_SECS".to_string(),
                "must be greater than 0".to_string(),
            ));
        }
        let cache_ttl_secs = env.parse_or(
            "ROCKETSHOES_PRODUCT_CACHE_TTL_SECS",
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            inventory: InventoryConfig {
                base_url,
                api_token,
                timeout: Duration::from_secs(timeout_secs),
                product_cache_ttl: (cache_ttl_secs > 0).then(|| Duration::from_secs(cache_ttl_secs)),
            },
            storage_path: PathBuf::from(
                env.or_default("ROCKETSHOES_STORAGE_PATH", DEFAULT_STORAGE_PATH),
            ),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional environment variable.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
    }

    /// Get an environment variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    /// Parse an environment variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key).map_or(Ok(default), |raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

/// Parse a service base URL, forcing a trailing slash so `Url::join` keeps
/// any path prefix (`http://host/api` + `stock/1` → `http://host/api/stock/1`).
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.inventory.base_url.as_str(), "http://localhost:3333/");
        assert!(config.inventory.api_token.is_none());
        assert_eq!(config.inventory.timeout, Duration::from_secs(10));
        assert_eq!(
            config.inventory.product_cache_ttl,
            Some(Duration::from_secs(300))
        );
        assert_eq!(config.storage_path, PathBuf::from("rocketshoes-storage.json"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let config = load(&[("ROCKETSHOES_API_URL", "https://shop.example/api")]).unwrap();
        let joined = config.inventory.base_url.join("stock/1").unwrap();
        assert_eq!(joined.as_str(), "https://shop.example/api/stock/1");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = load(&[("ROCKETSHOES_API_URL", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ROCKETSHOES_API_URL"));

        let err = load(&[("ROCKETSHOES_API_URL", "ftp://shop.example")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_cache_ttl_zero_disables_cache() {
        let config = load(&[("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS", "0")]).unwrap();
        assert!(config.inventory.product_cache_ttl.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        assert!(load(&[("ROCKETSHOES_API_TIMEOUT_SECS", "soon")]).is_err());
        assert!(load(&[("ROCKETSHOES_API_TIMEOUT_SECS", "0")]).is_err());
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let config = load(&[("ROCKETSHOES_API_TOKEN", "  ")]).unwrap();
        assert!(config.inventory.api_token.is_none());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("ROCKETSHOES_API_TOKEN", "tok_4f9a8c2e")]).unwrap();
        let debug = format!("{:?}", config.inventory);
        assert!(!debug.contains("tok_4f9a8c2e"));
        assert!(debug.contains("[REDACTED]"));
    }
}
