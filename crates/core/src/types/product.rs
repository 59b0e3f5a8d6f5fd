//! Product, stock and line item types.
//!
//! Product attributes (title, price, image, ...) are carried as an opaque JSON
//! object. The cart never interprets them; it only copies them from the
//! product lookup into the line item and back out to storage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;

/// Opaque product attributes, flattened next to `id` and `amount` on the wire.
pub type Attributes = Map<String, Value>;

/// A product as returned by the catalog's product lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product identifier.
    pub id: ProductId,
    /// Everything else the catalog returned for this product.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl Product {
    /// Create a product with the given attributes.
    #[must_use]
    pub const fn new(id: ProductId, attributes: Attributes) -> Self {
        Self { id, attributes }
    }
}

/// Available quantity of a product at the moment of the query.
///
/// The amount is signed: a catalog reporting negative stock (oversold) is
/// taken at its word and rejects every request as out of stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReading {
    /// Product identifier.
    pub id: ProductId,
    /// Units available.
    pub amount: i64,
}

/// One product-plus-quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product identifier, unique within a cart.
    pub id: ProductId,
    /// Quantity in the cart. Always at least 1.
    pub amount: u32,
    /// Product attributes copied verbatim from the lookup.
    #[serde(flatten)]
    pub attributes: Attributes,
}

impl LineItem {
    /// Create the first unit of a product in the cart.
    ///
    /// A stray `amount` key in the product attributes is dropped so that it
    /// cannot shadow the line item's own quantity once serialized.
    #[must_use]
    pub fn first_unit(product: Product) -> Self {
        let Product { id, mut attributes } = product;
        attributes.remove("amount");

        Self {
            id,
            amount: 1,
            attributes,
        }
    }

    /// Copy of this item with a different quantity.
    #[must_use]
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}
