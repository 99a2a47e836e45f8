//! The cart store.
//!
//! [`CartStore`] owns the current [`Cart`] snapshot and is the only thing
//! that changes it. Each operation checks live stock, builds a new cart,
//! persists it, and only then publishes it to readers.
//!
//! Mutations are serialized through a single writer lock held for the whole
//! lookup-build-persist sequence, so two operations racing on the same
//! product cannot overwrite each other's result.
//!
//! # Example
//!
//! ```rust,ignore
//! let store = CartStore::open(inventory, FileStore::new(path), LogNotifier).await?;
//!
//! store.add_product(ProductId::new(1)).await;
//! store.update_product_amount(ProductId::new(1), 3).await;
//! println!("{} items", store.cart().item_count());
//! ```

use std::sync::Arc;

use rocketshoes_core::{Cart, LineItem, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, instrument, warn};

use crate::error::{CartError, CartOperation, Result};
use crate::inventory::{Inventory, InventoryError};
use crate::notify::{Notification, Notifier};
use crate::storage::{CART_KEY, KeyValueStore};

/// Shopping cart state container.
///
/// Generic over its collaborators so each can be swapped independently:
/// `I` answers stock and product lookups, `S` persists the snapshot and `N`
/// shows failures to the user.
pub struct CartStore<I, S, N> {
    inventory: I,
    storage: S,
    notifier: N,
    cart: watch::Sender<Arc<Cart>>,
    writer: Mutex<()>,
}

impl<I, S, N> CartStore<I, S, N>
where
    I: Inventory,
    S: KeyValueStore,
    N: Notifier,
{
    /// Open the store, restoring the cart persisted in `storage`.
    ///
    /// A missing snapshot starts an empty cart. An unreadable snapshot is
    /// discarded with a warning; it is overwritten by the next successful
    /// operation.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Storage` if the store itself cannot be read.
    pub async fn open(inventory: I, storage: S, notifier: N) -> Result<Self> {
        let cart = load_snapshot(&storage).await?;
        debug!(items = cart.len(), "Cart restored");

        let (cart, _) = watch::channel(Arc::new(cart));
        Ok(Self {
            inventory,
            storage,
            notifier,
            cart,
            writer: Mutex::new(()),
        })
    }

    /// The current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Arc<Cart> {
        self.cart.borrow().clone()
    }

    /// Receive every cart published after a successful operation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Cart>> {
        self.cart.subscribe()
    }

    /// Add one unit of `product_id`.
    ///
    /// New products are appended with quantity 1. Failures are reported to
    /// the notifier and leave the cart unchanged.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) {
        let _writer = self.writer.lock().await;
        if let Err(err) = self.try_add(product_id).await {
            self.report(CartOperation::Add, product_id, &err);
        }
    }

    /// Remove `product_id` entirely.
    ///
    /// Removing a product that is not in the cart is reported as a failure.
    #[instrument(skip_all, fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) {
        let _writer = self.writer.lock().await;
        if let Err(err) = self.try_remove(product_id).await {
            self.report(CartOperation::Remove, product_id, &err);
        }
    }

    /// Set the quantity of `product_id` to `amount`.
    ///
    /// An amount of zero or less does nothing: the item is kept and nothing
    /// is reported.
    #[instrument(skip_all, fields(product_id = %product_id, amount = amount))]
    pub async fn update_product_amount(&self, product_id: ProductId, amount: i64) {
        if amount <= 0 {
            debug!(amount, "Ignoring non-positive amount");
            return;
        }
        // Anything past u32 cannot be in stock
        let amount = u32::try_from(amount).unwrap_or(u32::MAX);

        let _writer = self.writer.lock().await;
        if let Err(err) = self.try_update(product_id, amount).await {
            self.report(CartOperation::Update, product_id, &err);
        }
    }

    async fn try_add(&self, product_id: ProductId) -> Result<()> {
        let stock = self.inventory.stock(product_id).await?;
        let current = self.cart();
        let requested = current.amount_of(product_id).saturating_add(1);

        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested,
                available: stock.amount,
            });
        }

        let next = match current.with_amount(product_id, requested) {
            Some(next) => next,
            None => {
                let product = self.inventory.product(product_id).await?;
                if product.id != product_id {
                    return Err(InventoryError::Mismatch {
                        requested: product_id,
                        returned: product.id,
                    }
                    .into());
                }
                current.with_item(LineItem::new(product, 1))
            }
        };

        self.commit(next).await
    }

    async fn try_remove(&self, product_id: ProductId) -> Result<()> {
        let next = self
            .cart()
            .without(product_id)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(next).await
    }

    async fn try_update(&self, product_id: ProductId, amount: u32) -> Result<()> {
        let stock = self.inventory.stock(product_id).await?;

        if !stock.covers(amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount,
                available: stock.amount,
            });
        }

        let next = self
            .cart()
            .with_amount(product_id, amount)
            .ok_or(CartError::NotInCart(product_id))?;

        self.commit(next).await
    }

    /// Persist `next`, then publish it.
    ///
    /// Readers never see a cart that failed to persist.
    async fn commit(&self, next: Cart) -> Result<()> {
        let snapshot = serde_json::to_string(&next)?;
        self.storage.set(CART_KEY, snapshot).await?;

        debug!(items = next.len(), quantity = next.item_count(), "Cart committed");
        self.cart.send_replace(Arc::new(next));
        Ok(())
    }

    fn report(&self, operation: CartOperation, product_id: ProductId, err: &CartError) {
        if err.is_rejection() {
            warn!(%operation, %product_id, error = %err, "Cart operation rejected");
        } else {
            tracing::error!(%operation, %product_id, error = %err, "Cart operation failed");
        }
        self.notifier
            .notify(Notification::new(err.notice(operation)));
    }
}

/// Read the persisted cart, normalizing invalid entries away.
async fn load_snapshot<S: KeyValueStore>(storage: &S) -> Result<Cart> {
    let Some(raw) = storage.get(CART_KEY).await? else {
        return Ok(Cart::new());
    };

    let items: Vec<LineItem> = match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "Discarding unreadable cart snapshot");
            return Ok(Cart::new());
        }
    };

    let (cart, dropped) = Cart::normalized(items);
    if dropped > 0 {
        warn!(dropped, "Dropped invalid entries from cart snapshot");
    }
    Ok(cart)
}
