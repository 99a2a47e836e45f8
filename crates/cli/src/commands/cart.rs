//! Cart commands and cart rendering.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cart show
//!
//! # Add one unit of product 3
//! rs-cart add 3
//!
//! # Set product 3 to 2 units
//! rs-cart update 3 2
//!
//! # Remove product 3
//! rs-cart remove 3
//! ```

use std::io::{self, Write};

use rocketshoes_core::{Cart, Price, ProductId};
use rocketshoes_storefront::notify::{Notification, Notifier};
use rocketshoes_storefront::state::Storefront;
use serde::Serialize;

const TITLE_WIDTH: usize = 32;

/// A single cart operation requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update(ProductId, i64),
}

/// Run `action` against the storefront's cart store.
pub async fn run<N: Notifier>(storefront: &Storefront<N>, action: Action) {
    let store = storefront.cart();
    match action {
        Action::Show => {}
        Action::Add(product_id) => store.add_product(product_id).await,
        Action::Remove(product_id) => store.remove_product(product_id).await,
        Action::Update(product_id, amount) => {
            store.update_product_amount(product_id, amount).await;
        }
    }
}

/// Machine-readable report printed with `--json`.
#[derive(Serialize)]
struct CartReport<'a> {
    items: &'a Cart,
    item_count: u64,
    total: Price,
    notifications: &'a [Notification],
}

/// Write the cart as JSON, including any notifications raised.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_json(
    out: &mut impl Write,
    cart: &Cart,
    notifications: &[Notification],
) -> io::Result<()> {
    let report = CartReport {
        items: cart,
        item_count: cart.item_count(),
        total: cart.total(),
        notifications,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

/// Write the cart as a plain-text table.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn write_table(out: &mut impl Write, cart: &Cart) -> io::Result<()> {
    if cart.is_empty() {
        return writeln!(out, "Cart is empty");
    }

    writeln!(
        out,
        "{:>5}  {:<TITLE_WIDTH$}  {:>4}  {:>12}  {:>12}",
        "ID", "PRODUCT", "QTY", "PRICE", "SUBTOTAL"
    )?;
    for item in cart {
        writeln!(
            out,
            "{:>5}  {:<TITLE_WIDTH$}  {:>4}  {:>12}  {:>12}",
            item.id,
            truncate(&item.title, TITLE_WIDTH),
            item.amount,
            item.price.to_string(),
            item.subtotal().to_string()
        )?;
    }
    writeln!(
        out,
        "{} products, {} units, total {}",
        cart.len(),
        cart.item_count(),
        cart.total()
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rocketshoes_core::{LineItem, Product};

    use super::*;

    fn cart() -> Cart {
        Cart::new()
            .with_item(LineItem::new(
                Product {
                    id: ProductId::new(1),
                    title: "Tênis de Caminhada Leve Confortável".to_string(),
                    price: Price::from_cents(17_990),
                    image: "https://cdn.example/1.jpg".to_string(),
                },
                2,
            ))
            .with_item(LineItem::new(
                Product {
                    id: ProductId::new(2),
                    title: "Tênis VR Caminhada".to_string(),
                    price: Price::from_cents(13_990),
                    image: "https://cdn.example/2.jpg".to_string(),
                },
                1,
            ))
    }

    #[test]
    fn test_write_table() {
        let mut out = Vec::new();
        write_table(&mut out, &cart()).unwrap();
        let text = String::from_utf8(out).unwrap();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("R$ 359,80"));
        assert!(lines[2].contains("Tênis VR Caminhada"));
        assert_eq!(lines[3], "2 products, 3 units, total R$ 499,70");
    }

    #[test]
    fn test_write_table_empty() {
        let mut out = Vec::new();
        write_table(&mut out, &Cart::new()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Cart is empty\n");
    }

    #[test]
    fn test_write_json() {
        let mut out = Vec::new();
        write_json(&mut out, &cart(), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["item_count"], 3);
        assert_eq!(value["items"][0]["amount"], 2);
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert!(value["notifications"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("curto", 10), "curto");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }
}
