//! Application state shared across handlers.

use std::sync::Arc;

use crate::services::CartStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. It is built once in `main` and
/// is the only way handlers reach the session's cart store.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cart: CartStore,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(cart: CartStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cart }),
        }
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}
