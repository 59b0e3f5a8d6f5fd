//! RocketShoes Storefront library.
//!
//! This crate provides the cart store and its HTTP surface as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod storage;

#[cfg(test)]
mod testing;
