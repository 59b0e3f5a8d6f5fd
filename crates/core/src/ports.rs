//! Collaborator traits for the cart store.
//!
//! The cart logic talks to three outside collaborators: a catalog that answers
//! stock and product lookups, a key-value slot the cart is persisted to, and a
//! sink for user-facing notifications. Implementations live in the storefront
//! crate; tests substitute in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::notification::Notification;
use crate::types::{Product, ProductId, StockReading};

/// Boxed source error from a concrete backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during a catalog lookup.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog has no record of this product.
    #[error("Product {0} not found")]
    NotFound(ProductId),

    /// The catalog answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// The response body was not what we expected.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Errors that can occur reading or writing the persisted cart slot.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other backend failure.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Stock and product lookups.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the currently available quantity of a product.
    async fn stock(&self, id: ProductId) -> Result<StockReading, CatalogError>;

    /// Fetch the full attributes of a product.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;
}

/// A durable string key-value store.
///
/// Access is synchronous so that removing a product from the cart never suspends.
pub trait CartStorage: Send + Sync {
    /// Read the value stored under `key`, or `None` if nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier: Send + Sync {
    /// Surface a notification to the user.
    fn notify(&self, notification: Notification);
}
