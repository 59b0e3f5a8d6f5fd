//! Test doubles shared by unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use rocketshoes_core::{Attributes, Catalog, CatalogError, Product, ProductId, StockReading};
use serde_json::json;
use tokio::sync::Barrier;

/// In-memory catalog with per-product stock.
#[derive(Default)]
pub struct StubCatalog {
    pub stock: Mutex<HashMap<ProductId, i64>>,
    pub offline: bool,
    pub stock_calls: AtomicUsize,
    pub product_calls: AtomicUsize,
    pub barrier: Option<Barrier>,
}

impl StubCatalog {
    pub fn with_stock(entries: &[(i32, i64)]) -> Self {
        let stock = entries
            .iter()
            .map(|&(id, amount)| (ProductId::new(id), amount))
            .collect();
        Self {
            stock: Mutex::new(stock),
            ..Self::default()
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }

    pub fn set_stock(&self, id: i32, amount: i64) {
        self.stock.lock().unwrap().insert(ProductId::new(id), amount);
    }
}

#[async_trait]
impl Catalog for StubCatalog {
    async fn stock(&self, id: ProductId) -> Result<StockReading, CatalogError> {
        self.stock_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.barrier {
            barrier.wait().await;
        }
        if self.offline {
            return Err(CatalogError::Transport("connection refused".into()));
        }
        let amount = self
            .stock
            .lock()
            .unwrap()
            .get(&id)
            .copied()
            .ok_or(CatalogError::NotFound(id))?;
        Ok(StockReading { id, amount })
    }

    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        if self.offline {
            return Err(CatalogError::Transport("connection refused".into()));
        }
        if !self.stock.lock().unwrap().contains_key(&id) {
            return Err(CatalogError::NotFound(id));
        }
        let mut attributes = Attributes::new();
        attributes.insert("title".to_string(), json!(format!("Tênis {id}")));
        attributes.insert("price".to_string(), json!(139.9));
        Ok(Product::new(id, attributes))
    }
}

