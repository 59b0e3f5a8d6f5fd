//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - The cart store and its three mutating operations
//! - `notify` - Notification sinks for failed cart operations

pub mod cart;
pub mod notify;

pub use cart::{CartSettings, CartStore, DEFAULT_STORAGE_KEY, StockPolicy};
pub use notify::{RecordingNotifier, TracingNotifier};
