//! HTTP client for the inventory service.

use std::sync::Arc;

use reqwest::StatusCode;
use rocketshoes_core::{Product, ProductId, Stock};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::cache::ProductCache;
use super::{Inventory, InventoryError};
use crate::config::InventoryConfig;

/// Longest slice of a response body copied into logs and errors.
const BODY_PREVIEW_CHARS: usize = 200;

// =============================================================================
// InventoryClient
// =============================================================================

/// Client for the inventory REST service.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct InventoryClient {
    inner: Arc<InventoryClientInner>,
}

struct InventoryClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_token: Option<SecretString>,
    products: Option<ProductCache>,
}

impl InventoryClient {
    /// Create a new inventory client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(InventoryClientInner {
                client,
                base_url: config.base_url.clone(),
                api_token: config.api_token.clone(),
                products: config.product_cache_ttl.map(ProductCache::new),
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// GET a JSON resource relative to the base URL.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, InventoryError> {
        let url = self.inner.base_url.join(path)?;

        let mut request = self.inner.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(path.to_string()));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %preview(&body),
                "Inventory service returned non-success status"
            );
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %preview(&body),
                "Failed to parse inventory response"
            );
            InventoryError::Parse(e)
        })
    }
}

impl Inventory for InventoryClient {
    /// Fetch live stock. Never cached.
    #[instrument(skip_all, fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let stock: Stock = self.get_json(&format!("stock/{id}")).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }

    /// Fetch product metadata, served from cache when enabled.
    #[instrument(skip_all, fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        if let Some(cache) = &self.inner.products
            && let Some(product) = cache.get(id).await
        {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = self.get_json(&format!("products/{id}")).await?;

        if let Some(cache) = &self.inner.products {
            cache.insert(product.clone()).await;
        }

        Ok(product)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
