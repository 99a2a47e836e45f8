//! Inventory and catalog service access.
//!
//! # Architecture
//!
//! - The remote service is the source of truth for stock - never cached
//! - Product metadata is cached in memory via `moka` (configurable TTL)
//! - [`CartStore`](crate::cart::CartStore) depends on the [`Inventory`] trait,
//!   so tests and alternative transports can stand in for HTTP
//!
//! # Endpoints
//!
//! - `GET /stock/{id}` → `{ "id": 1, "amount": 3 }`
//! - `GET /products/{id}` → `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_storefront::inventory::{Inventory, InventoryClient};
//!
//! let client = InventoryClient::new(&config.inventory)?;
//! let stock = client.stock(ProductId::new(1)).await?;
//! ```

mod cache;
mod client;

use std::future::Future;
use std::sync::Arc;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

pub use client::InventoryClient;

/// Errors that can occur when talking to the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Service returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be decoded.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Service answered with a record for a different product.
    #[error("Requested product {requested}, service returned {returned}")]
    Mismatch {
        requested: ProductId,
        returned: ProductId,
    },
}

/// Read-only stock and product lookups.
pub trait Inventory: Send + Sync {
    /// Current available quantity for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Display metadata for a product.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, InventoryError>> + Send;
}

impl<T: Inventory> Inventory for Arc<T> {
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send {
        (**self).stock(id)
    }

    fn product(
        &self,
        id: ProductId,
    ) -> impl Future<Output = Result<Product, InventoryError>> + Send {
        (**self).product(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_error_display() {
        let err = InventoryError::NotFound("stock 42".to_string());
        assert_eq!(err.to_string(), "Not found: stock 42");

        let err = InventoryError::Api {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 503 - maintenance");
    }
}
