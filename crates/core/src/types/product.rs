//! Catalog records served by the inventory service.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// Product metadata from `GET /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Display name. Some catalog exports call this `name`.
    #[serde(alias = "name")]
    pub title: String,
    pub price: Price,
    /// Image URL.
    pub image: String,
}

/// Available quantity from `GET /stock/{id}`.
///
/// Read fresh for every cart operation. The service may report a negative
/// amount (oversold), which covers no quantity at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: i64,
}

impl Stock {
    /// Whether `quantity` units can be held in a cart.
    #[must_use]
    pub fn covers(&self, quantity: u32) -> bool {
        i64::from(quantity) <= self.amount
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_name_alias() {
        let json = r#"{"id":1,"name":"Tênis de Caminhada","price":179.9,"image":"https://cdn/1.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.title, "Tênis de Caminhada");
        assert_eq!(product.price, Price::from_cents(17_990));
    }

    #[test]
    fn test_stock_covers() {
        let stock = Stock {
            id: ProductId::new(1),
            amount: 3,
        };
        assert!(stock.covers(3));
        assert!(!stock.covers(4));
    }

    #[test]
    fn test_negative_stock_covers_nothing() {
        let stock: Stock = serde_json::from_str(r#"{"id":4,"amount":-2}"#).unwrap();
        assert_eq!(stock.amount, -2);
        assert!(!stock.covers(1));
    }
}
