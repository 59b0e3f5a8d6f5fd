//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (cart storage reachable)
//!
//! # Cart (JSON)
//! GET  /cart                   - Current cart
//! GET  /cart/count             - Distinct products and total units
//! POST /cart/add               - Add one unit    {"product_id": 7}
//! POST /cart/remove            - Remove product  {"product_id": 7}
//! POST /cart/update            - Set amount      {"product_id": 7, "amount": 2}
//! ```

pub mod cart;
pub mod health;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::{request_id_middleware, trace_layer};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
        .route("/update", post(cart::update))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/cart", cart_routes())
}

/// Build the application with its state and request middleware.
///
/// Sentry layers are added by the binary on top of this.
pub fn app(state: AppState) -> Router {
    routes()
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer())
        .with_state(state)
}
