//! RocketShoes Core - Shared cart types and collaborator traits.
//!
//! This crate provides the types the cart is built from and the traits its
//! collaborators implement. It is used by:
//! - `storefront` - Cart store, catalog client, storage backends and HTTP surface
//! - `integration-tests` - End-to-end tests against a fake catalog
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no HTTP clients,
//! no filesystem access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Product IDs, line items, stock readings and the cart collection
//! - [`notification`] - Cart failures and the user-facing messages they map to
//! - [`ports`] - Catalog, storage and notifier traits

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod notification;
pub mod ports;
pub mod types;

pub use notification::*;
pub use ports::*;
pub use types::*;
