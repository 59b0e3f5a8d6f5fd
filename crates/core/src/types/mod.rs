//! Core types for RocketShoes.
//!
//! This module provides type-safe wrappers for the cart domain.

pub mod cart;
pub mod id;
pub mod product;

pub use cart::{Cart, CartInvariantError};
pub use id::*;
pub use product::{Attributes, LineItem, Product, StockReading};
