//! Cart route handlers.
//!
//! Every mutating handler answers with the full cart on success, so the
//! client can re-render without a second request. Failures answer with the
//! notification text in `{"error": "..."}`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rocketshoes_core::{Cart, CartOperation, ProductId};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Add or remove request body.
#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub product_id: ProductId,
}

/// Update amount request body.
#[derive(Debug, Deserialize)]
pub struct UpdateAmountRequest {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Cart size for the header badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCount {
    /// Distinct products.
    pub items: usize,
    /// Sum of amounts.
    pub units: u64,
}

impl From<&Cart> for CartCount {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.len(),
            units: cart.total_units(),
        }
    }
}

/// Unwrap a JSON body, turning extractor rejections into `AppError::BadRequest`.
fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}

/// Current cart.
pub async fn show(State(state): State<AppState>) -> Json<Cart> {
    Json(state.cart().cart())
}

/// Cart count badge.
pub async fn count(State(state): State<AppState>) -> Json<CartCount> {
    Json(CartCount::from(&state.cart().cart()))
}

/// Add one unit of a product.
#[instrument(skip(state, payload))]
pub async fn add(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Cart>> {
    let request = body(payload)?;
    state
        .cart()
        .add_product(request.product_id)
        .await
        .map(Json)
        .map_err(AppError::cart(CartOperation::Add))
}

/// Remove a product.
#[instrument(skip(state, payload))]
pub async fn remove(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ProductRequest>, JsonRejection>,
) -> Result<Json<Cart>> {
    let request = body(payload)?;
    state
        .cart()
        .remove_product(request.product_id)
        .map(Json)
        .map_err(AppError::cart(CartOperation::Remove))
}

/// Set a product's amount.
#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateAmountRequest>, JsonRejection>,
) -> Result<Json<Cart>> {
    let request = body(payload)?;
    state
        .cart()
        .update_product_amount(request.product_id, request.amount)
        .await
        .map(Json)
        .map_err(AppError::cart(CartOperation::UpdateAmount))
}
