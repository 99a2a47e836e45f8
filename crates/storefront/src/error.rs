//! Cart error handling.
//!
//! Every cart operation works internally in terms of [`CartError`]. At the
//! public boundary of [`CartStore`](crate::cart::CartStore) an error is
//! logged, mapped to its fixed [`Notice`] and swallowed.

use std::fmt;

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::notify::Notice;
use crate::storage::StorageError;

/// The three mutating cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        })
    }
}

/// Cart-level error type.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds available stock.
    #[error("Out of stock: product {product_id} requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u32,
        available: i64,
    },

    /// Operation targets a product that is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Stock or product lookup failed.
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Reading or writing the persisted snapshot failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The cart could not be serialized.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl CartError {
    /// Whether this is a business-rule rejection rather than a fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::OutOfStock { .. } | Self::NotInCart(_))
    }

    /// The user-facing notice for this error raised by `operation`.
    #[must_use]
    pub const fn notice(&self, operation: CartOperation) -> Notice {
        match (self, operation) {
            (Self::OutOfStock { .. }, CartOperation::Add) => Notice::AddOutOfStock,
            (Self::OutOfStock { .. }, CartOperation::Update) => Notice::UpdateOutOfStock,
            (_, CartOperation::Add) => Notice::AddFailed,
            (_, CartOperation::Remove) => Notice::RemoveFailed,
            (_, CartOperation::Update) => Notice::UpdateFailed,
        }
    }
}

/// Result type alias for `CartError`.
pub type Result<T> = std::result::Result<T, CartError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn out_of_stock() -> CartError {
        CartError::OutOfStock {
            product_id: ProductId::new(2),
            requested: 1,
            available: 0,
        }
    }

    #[test]
    fn test_cart_error_display() {
        assert_eq!(
            out_of_stock().to_string(),
            "Out of stock: product 2 requested 1, available 0"
        );
        assert_eq!(
            CartError::NotInCart(ProductId::new(9)).to_string(),
            "Product 9 is not in the cart"
        );
    }

    #[test]
    fn test_notice_mapping() {
        assert_eq!(out_of_stock().notice(CartOperation::Add), Notice::AddOutOfStock);
        assert_eq!(
            out_of_stock().notice(CartOperation::Update),
            Notice::UpdateOutOfStock
        );

        let missing = CartError::NotInCart(ProductId::new(1));
        assert_eq!(missing.notice(CartOperation::Remove), Notice::RemoveFailed);
        assert_eq!(missing.notice(CartOperation::Update), Notice::UpdateFailed);

        let lookup = CartError::Inventory(InventoryError::NotFound("stock/1".to_string()));
        assert_eq!(lookup.notice(CartOperation::Add), Notice::AddFailed);
    }

    #[test]
    fn test_is_rejection() {
        assert!(out_of_stock().is_rejection());
        assert!(CartError::NotInCart(ProductId::new(1)).is_rejection());
        assert!(!CartError::Inventory(InventoryError::NotFound(String::new())).is_rejection());
    }
}
