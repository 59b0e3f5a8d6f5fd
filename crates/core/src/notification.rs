//! Cart failures and the notifications they surface as.
//!
//! Every cart operation reports failure twice: as a typed [`CartError`] returned
//! to the caller, and as a single user-facing [`Notification`]. The message
//! strings are part of the storefront's public surface and must not change.

use serde::Serialize;
use thiserror::Error;

use crate::ports::{CatalogError, StorageError};
use crate::types::{CartInvariantError, ProductId};

/// Requested quantity exceeds available stock.
pub const MSG_OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
/// Adding a product failed.
pub const MSG_ADD_FAILED: &str = "Erro na adição do produto";
/// Removing a product failed.
pub const MSG_REMOVE_FAILED: &str = "Erro na remoção do produto";
/// Changing a product's quantity failed.
pub const MSG_UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";

/// The three mutating cart operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    Add,
    Remove,
    UpdateAmount,
}

impl CartOperation {
    /// Generic failure message for this operation.
    #[must_use]
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Add => MSG_ADD_FAILED,
            Self::Remove => MSG_REMOVE_FAILED,
            Self::UpdateAmount => MSG_UPDATE_FAILED,
        }
    }
}

/// Coarse classification of a cart failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartErrorKind {
    /// The request itself was invalid (amount below 1).
    Validation,
    /// More units were requested than are in stock.
    StockExceeded,
    /// The product is not in the cart.
    NotFound,
    /// A lookup, storage, or internal failure.
    Transport,
}

/// Errors returned by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Target amount below 1.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Requested quantity is above the stock reading.
    #[error("Product {id}: requested {requested}, only {available} in stock")]
    OutOfStock {
        id: ProductId,
        requested: i64,
        available: i64,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(ProductId),

    /// Stock or product lookup failed.
    #[error("Catalog error: {0}")]
    Lookup(#[from] CatalogError),

    /// Persisted slot could not be written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A computed cart broke an invariant.
    #[error("Invariant violated: {0}")]
    Invariant(#[from] CartInvariantError),

    /// In-memory state is unusable after a panic in another task.
    #[error("Cart state lock poisoned")]
    Poisoned,
}

impl CartError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> CartErrorKind {
        match self {
            Self::InvalidAmount(_) => CartErrorKind::Validation,
            Self::OutOfStock { .. } => CartErrorKind::StockExceeded,
            Self::NotInCart(_) => CartErrorKind::NotFound,
            Self::Lookup(_)
            | Self::Storage(_)
            | Self::Serialization(_)
            | Self::Invariant(_)
            | Self::Poisoned => CartErrorKind::Transport,
        }
    }

    /// User-facing message for this error raised by `operation`.
    ///
    /// Stock failures share one message across operations; everything else
    /// collapses to the operation's generic failure message.
    #[must_use]
    pub const fn message(&self, operation: CartOperation) -> &'static str {
        match self.kind() {
            CartErrorKind::StockExceeded => MSG_OUT_OF_STOCK,
            _ => operation.failure_message(),
        }
    }
}

/// A user-facing message emitted when a cart operation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Operation that failed.
    pub operation: CartOperation,
    /// Why it failed.
    pub kind: CartErrorKind,
    /// Text shown to the user.
    pub message: &'static str,
}

impl Notification {
    /// Build the default notification for `error` raised by `operation`.
    #[must_use]
    pub const fn for_error(operation: CartOperation, error: &CartError) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: error.message(operation),
        }
    }
}
