//! Storefront state assembled from configuration, as the CLI does it.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;

use rocketshoes_core::ProductId;
use rocketshoes_integration_tests::{FakeInventory, drain};
use rocketshoes_storefront::config::StorefrontConfig;
use rocketshoes_storefront::notify::{ChannelNotifier, Notice};
use rocketshoes_storefront::state::Storefront;

fn config_for(server: &FakeInventory, storage: &std::path::Path) -> StorefrontConfig {
    let vars = HashMap::from([
        ("ROCKETSHOES_API_URL".to_string(), server.base_url()),
        (
            "ROCKETSHOES_STORAGE_PATH".to_string(),
            storage.display().to_string(),
        ),
        ("ROCKETSHOES_PRODUCT_CACHE_TTL_SECS".to_string(), "0".to_string()),
    ]);
    StorefrontConfig::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[tokio::test]
async fn test_storefront_drives_cart_from_config() {
    let server = FakeInventory::start().await;
    server.add_product(7, "Tênis Nike Revolution 5", 15_990, 2);
    let dir = tempfile::tempdir().unwrap();
    let storage = dir.path().join("storage.json");

    let (notifier, mut notifications) = ChannelNotifier::new();
    let storefront = Storefront::new(config_for(&server, &storage), notifier)
        .await
        .unwrap();
    assert!(storefront.config().inventory.product_cache_ttl.is_none());

    let shared = storefront.clone();
    shared.cart().add_product(ProductId::new(7)).await;
    storefront.cart().add_product(ProductId::new(7)).await;
    storefront.cart().add_product(ProductId::new(7)).await;

    assert_eq!(storefront.cart().cart().amount_of(ProductId::new(7)), 2);
    assert_eq!(
        drain(&mut notifications)
            .into_iter()
            .map(|n| n.notice)
            .collect::<Vec<_>>(),
        vec![Notice::AddOutOfStock]
    );

    let (notifier, _notifications) = ChannelNotifier::new();
    let restarted = Storefront::new(config_for(&server, &storage), notifier)
        .await
        .unwrap();
    assert_eq!(restarted.cart().cart(), storefront.cart().cart());
}

#[tokio::test]
async fn test_subscribers_see_committed_changes() {
    let server = FakeInventory::start().await;
    server.add_product(1, "Tênis de Caminhada Leve Confortável", 17_990, 5);
    let dir = tempfile::tempdir().unwrap();

    let (notifier, _notifications) = ChannelNotifier::new();
    let storefront = Storefront::new(config_for(&server, &dir.path().join("s.json")), notifier)
        .await
        .unwrap();

    let mut updates = storefront.cart().subscribe();
    storefront.cart().add_product(ProductId::new(1)).await;

    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().amount_of(ProductId::new(1)), 1);

    storefront.cart().remove_product(ProductId::new(99)).await;
    assert!(!updates.has_changed().unwrap());
}
