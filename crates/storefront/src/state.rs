//! Application state handed to cart consumers.

use std::sync::Arc;

use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::error::CartError;
use crate::inventory::{InventoryClient, InventoryError};
use crate::notify::Notifier;
use crate::storage::FileStore;

/// Error assembling the storefront state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("inventory client: {0}")]
    Inventory(#[from] InventoryError),
    #[error("cart store: {0}")]
    Cart(#[from] CartError),
}

/// The production cart store: HTTP inventory, file-backed storage.
pub type StorefrontCart<N> = CartStore<InventoryClient, FileStore, N>;

/// State shared by everything that shows or changes the cart.
///
/// This struct is cheaply cloneable via `Arc`; every clone drives the same
/// cart store. Pass it to consumers explicitly rather than reaching for a
/// global.
pub struct Storefront<N> {
    inner: Arc<StorefrontInner<N>>,
}

struct StorefrontInner<N> {
    config: StorefrontConfig,
    inventory: InventoryClient,
    cart: StorefrontCart<N>,
}

impl<N> Clone for Storefront<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<N: Notifier> Storefront<N> {
    /// Build the storefront state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `notifier` - Sink for user-facing cart notifications
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the persisted
    /// cart cannot be read.
    pub async fn new(config: StorefrontConfig, notifier: N) -> Result<Self, StateError> {
        let inventory = InventoryClient::new(&config.inventory)?;
        let storage = FileStore::new(&config.storage_path);
        let cart = CartStore::open(inventory.clone(), storage, notifier).await?;

        tracing::debug!(
            api = %inventory.base_url(),
            storage = %config.storage_path.display(),
            "Storefront state ready"
        );

        Ok(Self {
            inner: Arc::new(StorefrontInner {
                config,
                inventory,
                cart,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the inventory client.
    #[must_use]
    pub fn inventory(&self) -> &InventoryClient {
        &self.inner.inventory
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &StorefrontCart<N> {
        &self.inner.cart
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{Cart, LineItem, Price, Product, ProductId};

    use super::*;
    use crate::notify::LogNotifier;
    use crate::storage::{CART_KEY, KeyValueStore};

    fn config(storage_path: std::path::PathBuf) -> StorefrontConfig {
        let mut config = StorefrontConfig::from_lookup(|_| None).unwrap();
        config.storage_path = storage_path;
        config
    }

    #[tokio::test]
    async fn test_new_restores_cart_from_storage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let cart = Cart::new().with_item(LineItem::new(
            Product {
                id: ProductId::new(1),
                title: "Tênis".to_string(),
                price: Price::from_cents(17_990),
                image: "https://cdn.example/1.jpg".to_string(),
            },
            2,
        ));
        FileStore::new(&path)
            .set(CART_KEY, serde_json::to_string(&cart).unwrap())
            .await
            .unwrap();

        let storefront = Storefront::new(config(path), LogNotifier).await.unwrap();
        assert_eq!(*storefront.cart().cart(), cart);

        // Clones share the same store
        let clone = storefront.clone();
        assert!(std::ptr::eq(clone.cart(), storefront.cart()));
    }

    #[tokio::test]
    async fn test_new_fails_on_corrupt_storage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "[1, 2").unwrap();

        let err = Storefront::new(config(path), LogNotifier).await.err().unwrap();
        assert!(matches!(err, StateError::Cart(CartError::Storage(_))));
    }
}
