//! Cache for product metadata.
//!
//! Stock is deliberately absent: every cart operation must see live stock.

use std::time::Duration;

use moka::future::Cache;
use rocketshoes_core::{Product, ProductId};

const MAX_CAPACITY: u64 = 1000;

/// Product metadata keyed by id.
#[derive(Clone)]
pub(super) struct ProductCache {
    inner: Cache<ProductId, Product>,
}

impl ProductCache {
    pub(super) fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(MAX_CAPACITY)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub(super) async fn get(&self, id: ProductId) -> Option<Product> {
        self.inner.get(&id).await
    }

    pub(super) async fn insert(&self, product: Product) {
        self.inner.insert(product.id, product).await;
    }
}
