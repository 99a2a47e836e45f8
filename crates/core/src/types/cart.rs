//! Cart line items and the cart snapshot.
//!
//! A [`Cart`] is never edited in place. Every change builds a new cart, which
//! the owner then swaps in and persists. Serialized, a cart is a bare JSON
//! array of line items, the same shape the web client keeps in local storage.

use serde::{Deserialize, Serialize};

use super::{Price, Product, ProductId};

/// One product entry in the cart.
///
/// Display metadata is copied from the catalog when the product is first
/// added and is not refreshed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    #[serde(alias = "name")]
    pub title: String,
    pub price: Price,
    pub image: String,
    /// Quantity held. Always at least 1 inside a [`Cart`].
    pub amount: u32,
}

impl LineItem {
    /// Build a line item from catalog metadata.
    #[must_use]
    pub fn new(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// Ordered list of line items, unique by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from untrusted items, e.g. a persisted snapshot.
    ///
    /// Items with a zero amount and repeated ids are dropped; the first
    /// occurrence of an id wins. Returns the cart and the number of items
    /// that were dropped.
    #[must_use]
    pub fn normalized(items: Vec<LineItem>) -> (Self, usize) {
        let total = items.len();
        let mut kept: Vec<LineItem> = Vec::with_capacity(total);
        for item in items {
            if item.amount == 0 || kept.iter().any(|k| k.id == item.id) {
                continue;
            }
            kept.push(item);
        }
        let dropped = total - kept.len();
        (Self { items: kept }, dropped)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Quantity held for `id`, or 0 when absent.
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// A copy of this cart with `item` appended, or replacing the entry with
    /// the same id in place.
    ///
    /// An item with a zero amount removes the entry instead.
    #[must_use]
    pub fn with_item(&self, item: LineItem) -> Self {
        if item.amount == 0 {
            return self.without(item.id).unwrap_or_else(|| self.clone());
        }
        let mut items = self.items.clone();
        match items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Self { items }
    }

    /// A copy of this cart with the quantity for `id` set to `amount`.
    ///
    /// Returns `None` when `id` is not in the cart. An amount of 0 removes
    /// the entry.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if amount == 0 {
            return self.without(id);
        }
        let position = self.items.iter().position(|item| item.id == id)?;
        let mut items = self.items.clone();
        if let Some(item) = items.get_mut(position) {
            item.amount = amount;
        }
        Some(Self { items })
    }

    /// A copy of this cart without `id`, or `None` when it is not present.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        let position = self.items.iter().position(|item| item.id == id)?;
        let mut items = self.items.clone();
        items.remove(position);
        Some(Self { items })
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, amount: u32) -> LineItem {
        LineItem {
            id: ProductId::new(id),
            title: format!("Tênis {id}"),
            price: Price::from_cents(10_000),
            image: format!("https://cdn.example/{id}.jpg"),
            amount,
        }
    }

    fn cart(items: &[(i32, u32)]) -> Cart {
        items
            .iter()
            .fold(Cart::new(), |cart, &(id, amount)| cart.with_item(item(id, amount)))
    }

    #[test]
    fn test_with_item_appends_in_order() {
        let cart = cart(&[(3, 1), (1, 2)]);
        let ids: Vec<i32> = cart.iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_with_item_replaces_existing_in_place() {
        let cart = cart(&[(1, 1), (2, 1)]).with_item(item(1, 4));
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items().first().map(|i| i.amount), Some(4));
    }

    #[test]
    fn test_with_amount_leaves_other_items_untouched() {
        let before = cart(&[(1, 1), (2, 5)]);
        let after = before.with_amount(ProductId::new(1), 3).unwrap();
        assert_eq!(after.amount_of(ProductId::new(1)), 3);
        assert_eq!(after.get(ProductId::new(2)), before.get(ProductId::new(2)));
        // Original snapshot is unchanged
        assert_eq!(before.amount_of(ProductId::new(1)), 1);
    }

    #[test]
    fn test_with_amount_zero_removes() {
        let after = cart(&[(1, 1), (2, 1)])
            .with_amount(ProductId::new(1), 0)
            .unwrap();
        assert!(!after.contains(ProductId::new(1)));
        assert_eq!(after.len(), 1);
    }

    #[test]
    fn test_with_amount_missing_id() {
        assert!(cart(&[(1, 1)]).with_amount(ProductId::new(9), 2).is_none());
    }

    #[test]
    fn test_without() {
        let before = cart(&[(1, 1), (2, 1)]);
        let after = before.without(ProductId::new(2)).unwrap();
        assert_eq!(after.len(), before.len() - 1);
        assert!(!after.contains(ProductId::new(2)));
        assert!(before.without(ProductId::new(7)).is_none());
    }

    #[test]
    fn test_normalized_drops_zero_amounts_and_duplicates() {
        let (cart, dropped) = Cart::normalized(vec![item(1, 2), item(2, 0), item(1, 9)]);
        assert_eq!(dropped, 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
    }

    #[test]
    fn test_totals() {
        let cart = cart(&[(1, 2), (2, 1)]);
        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(30_000));
        assert_eq!(Cart::new().total(), Price::ZERO);
    }

    #[test]
    fn test_serializes_as_json_array() {
        let json = serde_json::to_value(cart(&[(1, 1)])).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "id": 1,
                "title": "Tênis 1",
                "price": 100.0,
                "image": "https://cdn.example/1.jpg",
                "amount": 1
            }])
        );
    }
}
