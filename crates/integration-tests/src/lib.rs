//! Integration test support for the RocketShoes storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rocketshoes-integration-tests
//! ```
//!
//! No external services are needed: [`FakeCatalog`] serves the catalog API
//! (`/stock/{id}`, `/products/{id}`) from memory on an ephemeral local port,
//! and the storefront talks to it through its real HTTP client.
//!
//! # Test Categories
//!
//! - `cart_flow` - Cart store against the fake catalog and on-disk storage
//! - `http_api` - Storefront routes end to end over a live socket

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// A canned failure for one product id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Answer with this HTTP status and a plain text body.
    Status(u16),
    /// Answer 200 with a body that is not JSON.
    Garbage,
}

#[derive(Default)]
struct Inventory {
    stock: HashMap<i32, i64>,
    products: HashMap<i32, Value>,
    faults: HashMap<i32, Fault>,
}

type SharedInventory = Arc<Mutex<Inventory>>;

/// In-process catalog API.
///
/// The server task is aborted when the value is dropped.
pub struct FakeCatalog {
    addr: SocketAddr,
    inventory: SharedInventory,
    server: JoinHandle<()>,
}

impl FakeCatalog {
    /// Start an empty catalog on `127.0.0.1:0`.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start() -> Self {
        let inventory = SharedInventory::default();

        let app = Router::new()
            .route("/stock/{id}", get(stock))
            .route("/products/{id}", get(product))
            .with_state(Arc::clone(&inventory));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake catalog");
        let addr = listener.local_addr().expect("Fake catalog has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            inventory,
            server,
        }
    }

    /// Base URL to point the storefront's catalog client at.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).expect("Fake catalog URL")
    }

    /// Register a sneaker with `amount` units in stock.
    ///
    /// The product document carries a title, price and image like the real
    /// catalog does.
    pub fn add_sneaker(&self, id: i32, title: &str, price: f64, amount: i64) {
        let document = json!({
            "id": id,
            "title": title,
            "price": price,
            "image": format!("https://cdn.rocketshoes.example/sneakers/{id}.jpg"),
        });
        let mut inventory = self.lock();
        inventory.products.insert(id, document);
        inventory.stock.insert(id, amount);
    }

    /// Change the stock of a product.
    pub fn set_stock(&self, id: i32, amount: i64) {
        self.lock().stock.insert(id, amount);
    }

    /// Replace the product document served for `id`.
    pub fn set_product(&self, id: i32, document: Value) {
        self.lock().products.insert(id, document);
    }

    /// Make every lookup of `id` fail with `fault`.
    pub fn break_product(&self, id: i32, fault: Fault) {
        self.lock().faults.insert(id, fault);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inventory> {
        self.inventory.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for FakeCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn fault_response(fault: Fault) -> Response {
    match fault {
        Fault::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            "catalog failure",
        )
            .into_response(),
        Fault::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}

async fn stock(State(inventory): State<SharedInventory>, Path(id): Path<i32>) -> Response {
    let inventory = inventory.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(&fault) = inventory.faults.get(&id) {
        return fault_response(fault);
    }
    match inventory.stock.get(&id) {
        Some(&amount) => Json(json!({ "id": id, "amount": amount })).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn product(State(inventory): State<SharedInventory>, Path(id): Path<i32>) -> Response {
    let inventory = inventory.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(&fault) = inventory.faults.get(&id) {
        return fault_response(fault);
    }
    match inventory.products.get(&id) {
        Some(document) => Json(document.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
