//! Cart store: the in-memory cart and its persisted mirror.
//!
//! # Consistency
//!
//! Each operation takes a snapshot of the cart, optionally awaits a catalog
//! lookup, computes a whole new cart and commits it. A commit writes the
//! persisted slot first and swaps the in-memory cart only if that write
//! succeeded. Commits are serialized by a separate commit lock held across the
//! storage write, so the last cart written is always the cart in memory. The
//! cart lock itself is taken only for the swap: readers never wait on disk I/O,
//! and until the swap they keep seeing the previous cart.
//!
//! The lock is never held across a lookup. Two overlapping operations on the
//! same product can therefore both start from the same snapshot, and the later
//! commit overwrites the earlier one (lost update). This is a known limitation
//! of the read-modify-write pattern and is left as is.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rocketshoes_core::{
    Cart, CartError, CartOperation, CartStorage, Catalog, CatalogError, LineItem, Notification,
    Notifier, ProductId, StorageError,
};
use tracing::{debug, info, instrument, warn};

/// Whether the first unit of a product is checked against stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
    /// Only increments of a product already in the cart are checked.
    #[default]
    Lenient,
    /// Every unit added is checked, including the first.
    Strict,
}

/// Cart store settings.
#[derive(Debug, Clone)]
pub struct CartSettings {
    /// Storage key the cart is persisted under.
    pub storage_key: String,
    /// Stock validation policy for new items.
    pub stock_policy: StockPolicy,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            stock_policy: StockPolicy::default(),
        }
    }
}

/// Storage key used by the storefront.
pub const DEFAULT_STORAGE_KEY: &str = "@RocketShoes:cart";

/// Maximum characters of discarded stored content written to the log.
const MAX_LOGGED_CONTENT: usize = 500;

/// Authoritative cart for one session.
pub struct CartStore {
    cart: RwLock<Cart>,
    commit_lock: Mutex<()>,
    settings: CartSettings,
    catalog: Arc<dyn Catalog>,
    storage: Arc<dyn CartStorage>,
    notifier: Arc<dyn Notifier>,
}

impl CartStore {
    /// Create a cart store, restoring the cart from storage.
    ///
    /// A missing slot starts an empty cart. Stored content that does not parse
    /// as a valid cart is logged, discarded and replaced with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot cannot be read, or cannot be reset after
    /// holding malformed content.
    pub fn load(
        settings: CartSettings,
        catalog: Arc<dyn Catalog>,
        storage: Arc<dyn CartStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, StorageError> {
        let cart = restore(storage.as_ref(), &settings.storage_key)?;
        info!(
            key = %settings.storage_key,
            items = cart.len(),
            "Cart restored"
        );

        Ok(Self {
            cart: RwLock::new(cart),
            commit_lock: Mutex::new(()),
            settings,
            catalog,
            storage,
            notifier,
        })
    }

    /// Snapshot of the current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.cart
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Check that the persisted slot is reachable.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the slot cannot be read.
    pub fn check_storage(&self) -> Result<(), StorageError> {
        self.storage.get(&self.settings.storage_key).map(|_| ())
    }

    /// Add one unit of a product.
    ///
    /// A product already in the cart is incremented after checking stock. A new
    /// product is looked up and appended with an amount of 1; its stock is only
    /// checked under [`StockPolicy::Strict`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] if the new amount exceeds stock, or the
    /// lookup/storage error that aborted the operation. The cart is unchanged
    /// and a notification has been emitted.
    #[instrument(skip(self))]
    pub async fn add_product(&self, id: ProductId) -> Result<Cart, CartError> {
        let result = self.try_add(id).await;
        self.finish(CartOperation::Add, result)
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if the product is not in the cart, or
    /// the storage error that aborted the operation.
    #[instrument(skip(self))]
    pub fn remove_product(&self, id: ProductId) -> Result<Cart, CartError> {
        let result = self.try_remove(id);
        self.finish(CartOperation::Remove, result)
    }

    /// Set the amount of a product in the cart.
    ///
    /// A product that is not in the cart is left alone and the unchanged cart
    /// is returned.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidAmount`] for amounts below 1,
    /// [`CartError::OutOfStock`] if the amount exceeds stock, or the
    /// lookup/storage error that aborted the operation.
    #[instrument(skip(self))]
    pub async fn update_product_amount(
        &self,
        id: ProductId,
        amount: i64,
    ) -> Result<Cart, CartError> {
        let result = self.try_update_amount(id, amount).await;
        self.finish(CartOperation::UpdateAmount, result)
    }

    async fn try_add(&self, id: ProductId) -> Result<Cart, CartError> {
        let current = self.snapshot()?;

        let next = if let Some(existing) = current.get(id) {
            let stock = self.catalog.stock(id).await?;
            let requested = existing.amount.saturating_add(1);
            if i64::from(requested) > stock.amount {
                return Err(CartError::OutOfStock {
                    id,
                    requested: i64::from(requested),
                    available: stock.amount,
                });
            }
            current.with_amount(id, requested)?
        } else {
            if self.settings.stock_policy == StockPolicy::Strict {
                let stock = self.catalog.stock(id).await?;
                if stock.amount < 1 {
                    return Err(CartError::OutOfStock {
                        id,
                        requested: 1,
                        available: stock.amount,
                    });
                }
            }

            let product = self.catalog.product(id).await?;
            if product.id != id {
                return Err(CatalogError::Parse(format!(
                    "product lookup for {id} returned product {}",
                    product.id
                ))
                .into());
            }
            current.with_appended(LineItem::first_unit(product))?
        };

        self.commit(next)
    }

    fn try_remove(&self, id: ProductId) -> Result<Cart, CartError> {
        let current = self.snapshot()?;
        let next = current.without(id).ok_or(CartError::NotInCart(id))?;
        self.commit(next)
    }

    async fn try_update_amount(&self, id: ProductId, amount: i64) -> Result<Cart, CartError> {
        if amount < 1 {
            return Err(CartError::InvalidAmount(amount));
        }

        let current = self.snapshot()?;
        let stock = self.catalog.stock(id).await?;
        if amount > stock.amount {
            return Err(CartError::OutOfStock {
                id,
                requested: amount,
                available: stock.amount,
            });
        }

        let amount = u32::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;
        if !current.contains(id) {
            debug!(%id, "Product not in cart, amount change has no effect");
        }
        self.commit(current.with_amount(id, amount)?)
    }

    fn snapshot(&self) -> Result<Cart, CartError> {
        self.cart
            .read()
            .map(|cart| cart.clone())
            .map_err(|_| CartError::Poisoned)
    }

    /// Persist `next` and make it the current cart.
    fn commit(&self, next: Cart) -> Result<Cart, CartError> {
        let serialized = serde_json::to_string(&next)?;

        let _commit = self.commit_lock.lock().map_err(|_| CartError::Poisoned)?;
        self.storage.set(&self.settings.storage_key, &serialized)?;
        *self.cart.write().map_err(|_| CartError::Poisoned)? = next.clone();

        Ok(next)
    }

    fn finish(
        &self,
        operation: CartOperation,
        result: Result<Cart, CartError>,
    ) -> Result<Cart, CartError> {
        match &result {
            Ok(cart) => {
                debug!(?operation, items = cart.len(), units = cart.total_units(), "Cart updated");
            }
            Err(err) => {
                warn!(?operation, kind = ?err.kind(), error = %err, "Cart operation failed");
                self.notifier.notify(Notification::for_error(operation, err));
            }
        }
        result
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("settings", &self.settings)
            .field("cart", &self.cart())
            .finish_non_exhaustive()
    }
}

/// Read the cart stored under `key`.
fn restore(storage: &dyn CartStorage, key: &str) -> Result<Cart, StorageError> {
    let Some(raw) = storage.get(key)? else {
        return Ok(Cart::new());
    };

    match serde_json::from_str::<Cart>(&raw) {
        Ok(cart) => Ok(cart),
        Err(e) => {
            warn!(
                key,
                error = %e,
                stored = %raw.chars().take(MAX_LOGGED_CONTENT).collect::<String>(),
                "Discarding malformed stored cart"
            );
            storage.set(key, "[]")?;
            Ok(Cart::new())
        }
    }
}
