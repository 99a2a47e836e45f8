//! Integration test support for RocketShoes.
//!
//! [`FakeInventory`] serves the inventory REST API (`GET /stock/{id}`,
//! `GET /products/{id}`) from an in-memory catalog on a loopback port, so the
//! real [`InventoryClient`](rocketshoes_storefront::inventory::InventoryClient)
//! can be exercised end to end.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use rocketshoes_core::{Price, Product, ProductId, Stock};
use rocketshoes_storefront::cart::CartStore;
use rocketshoes_storefront::config::InventoryConfig;
use rocketshoes_storefront::inventory::InventoryClient;
use rocketshoes_storefront::notify::{ChannelNotifier, Notification};
use rocketshoes_storefront::storage::FileStore;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Cart store wired the way the storefront wires it.
pub type TestCart = CartStore<InventoryClient, FileStore, ChannelNotifier>;

#[derive(Default)]
struct Catalog {
    products: HashMap<i32, Product>,
    stock: HashMap<i32, i64>,
    hits: HashMap<String, usize>,
    last_authorization: Option<String>,
    failing: bool,
}

type SharedCatalog = Arc<Mutex<Catalog>>;

fn lock(catalog: &Mutex<Catalog>) -> MutexGuard<'_, Catalog> {
    catalog.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the inventory service.
pub struct FakeInventory {
    addr: SocketAddr,
    catalog: SharedCatalog,
    server: JoinHandle<()>,
}

impl FakeInventory {
    /// Bind to an ephemeral loopback port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let catalog = SharedCatalog::default();

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&catalog));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake inventory listener");
        let addr = listener.local_addr().expect("listener address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            catalog,
            server,
        }
    }

    /// Base URL to hand to [`InventoryConfig::new`].
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration for this server, product cache enabled.
    ///
    /// # Panics
    ///
    /// Panics if the loopback URL is rejected.
    #[must_use]
    pub fn config(&self) -> InventoryConfig {
        InventoryConfig::new(&self.base_url()).expect("loopback URL is valid")
    }

    /// List a product with `stock` units available.
    pub fn add_product(&self, id: i32, title: &str, cents: i64, stock: i64) {
        let mut catalog = lock(&self.catalog);
        catalog.products.insert(
            id,
            Product {
                id: ProductId::new(id),
                title: title.to_string(),
                price: Price::from_cents(cents),
                image: format!("https://cdn.rocketshoes.test/{id}.jpg"),
            },
        );
        catalog.stock.insert(id, stock);
    }

    /// Change the available stock of a listed product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        lock(&self.catalog).stock.insert(id, amount);
    }

    /// Make every endpoint answer `500 Internal Server Error`.
    pub fn set_failing(&self, failing: bool) {
        lock(&self.catalog).failing = failing;
    }

    /// How many requests hit `path` (e.g. `"/stock/1"`).
    #[must_use]
    pub fn hits(&self, path: &str) -> usize {
        lock(&self.catalog).hits.get(path).copied().unwrap_or(0)
    }

    /// `Authorization` header of the most recent request.
    #[must_use]
    pub fn last_authorization(&self) -> Option<String> {
        lock(&self.catalog).last_authorization.clone()
    }
}

impl Drop for FakeInventory {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Open a cart store against `config`, persisting to `storage_path`.
///
/// # Panics
///
/// Panics if the client cannot be built or the storage file is unreadable.
pub async fn open_cart(
    config: &InventoryConfig,
    storage_path: &Path,
) -> (TestCart, UnboundedReceiver<Notification>) {
    let inventory = InventoryClient::new(config).expect("build inventory client");
    let (notifier, notifications) = ChannelNotifier::new();
    let cart = CartStore::open(inventory, FileStore::new(storage_path), notifier)
        .await
        .expect("open cart store");
    (cart, notifications)
}

/// Collect every notification raised so far.
pub fn drain(notifications: &mut UnboundedReceiver<Notification>) -> Vec<Notification> {
    std::iter::from_fn(|| notifications.try_recv().ok()).collect()
}

fn record(catalog: &mut Catalog, path: String, headers: &HeaderMap) {
    *catalog.hits.entry(path).or_default() += 1;
    catalog.last_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
}

#[allow(clippy::unused_async)]
async fn stock(
    State(catalog): State<SharedCatalog>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    let mut catalog = lock(&catalog);
    record(&mut catalog, format!("/stock/{id}"), &headers);

    if catalog.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "inventory offline").into_response();
    }

    match catalog.stock.get(&id) {
        Some(&amount) => Json(Stock {
            id: ProductId::new(id),
            amount,
        })
        .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[allow(clippy::unused_async)]
async fn product(
    State(catalog): State<SharedCatalog>,
    UrlPath(id): UrlPath<i32>,
    headers: HeaderMap,
) -> Response {
    let mut catalog = lock(&catalog);
    record(&mut catalog, format!("/products/{id}"), &headers);

    if catalog.failing {
        return (StatusCode::INTERNAL_SERVER_ERROR, "inventory offline").into_response();
    }

    match catalog.products.get(&id) {
        Some(product) => Json(product.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
