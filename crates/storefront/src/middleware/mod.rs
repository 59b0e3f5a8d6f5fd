//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, added in `main`)
//! 2. `TraceLayer` (request span with an empty `request_id` field)
//! 3. Request ID (fill in the span field, tag Sentry, echo the header)

pub mod request_id;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware, trace_layer};
