//! The cart collection.
//!
//! A [`Cart`] is an ordered list of [`LineItem`]s in which no two items share a
//! product ID and every amount is at least 1. Both properties are checked when
//! a cart is deserialized, and every transition below returns a new cart
//! instead of mutating elements in place.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::LineItem;

/// A list of line items that violates the cart invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartInvariantError {
    /// Two line items share the same product ID.
    #[error("product {0} appears more than once")]
    DuplicateProduct(ProductId),
    /// A line item has an amount of zero.
    #[error("product {0} has an amount of zero")]
    ZeroAmount(ProductId),
}

/// Ordered, duplicate-free list of line items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Iterate over the line items.
    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Find the line item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the cart has a line item for this product.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no line items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line item amounts.
    #[must_use]
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// New cart with `item` appended.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is already in the cart or the amount is zero.
    pub fn with_appended(&self, item: LineItem) -> Result<Self, CartInvariantError> {
        if self.contains(item.id) {
            return Err(CartInvariantError::DuplicateProduct(item.id));
        }
        if item.amount == 0 {
            return Err(CartInvariantError::ZeroAmount(item.id));
        }

        let mut items = self.items.clone();
        items.push(item);
        Ok(Self { items })
    }

    /// New cart with the amount of `id` replaced.
    ///
    /// Products not in the cart are left alone, so an unknown ID yields an
    /// identical cart.
    ///
    /// # Errors
    ///
    /// Returns an error if `amount` is zero.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Result<Self, CartInvariantError> {
        if amount == 0 {
            return Err(CartInvariantError::ZeroAmount(id));
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    item.with_amount(amount)
                } else {
                    item.clone()
                }
            })
            .collect();
        Ok(Self { items })
    }

    /// New cart without the line item for `id`, or `None` if it is not in the cart.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}

impl TryFrom<Vec<LineItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<LineItem>) -> Result<Self, Self::Error> {
        let mut seen = std::collections::HashSet::with_capacity(items.len());
        for item in &items {
            if item.amount == 0 {
                return Err(CartInvariantError::ZeroAmount(item.id));
            }
            if !seen.insert(item.id) {
                return Err(CartInvariantError::DuplicateProduct(item.id));
            }
        }
        Ok(Self { items })
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
