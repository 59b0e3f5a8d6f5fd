//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//!
//! Cart failures are answered with the same user-facing message the cart
//! store emitted as a notification, in a `{"error": "..."}` JSON body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rocketshoes_core::{CartError, CartErrorKind, CartOperation};
use serde::Serialize;
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A cart operation failed.
    #[error("Cart {operation:?} failed: {source}")]
    Cart {
        operation: CartOperation,
        #[source]
        source: CartError,
    },

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A dependency the storefront needs is not reachable.
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    /// Wrap a cart error raised by `operation`.
    #[must_use]
    pub fn cart(operation: CartOperation) -> impl FnOnce(CartError) -> Self {
        move |source| Self::Cart { operation, source }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart { source, .. } => match source {
                CartError::Lookup(_) => StatusCode::BAD_GATEWAY,
                other => match other.kind() {
                    CartErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                    CartErrorKind::StockExceeded => StatusCode::CONFLICT,
                    CartErrorKind::NotFound => StatusCode::NOT_FOUND,
                    CartErrorKind::Transport => StatusCode::INTERNAL_SERVER_ERROR,
                },
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::Cart { operation, source } => source.message(*operation).to_string(),
            Self::BadRequest(msg) => msg.clone(),
            Self::Unavailable(_) => "Service unavailable".to_string(),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (
            status,
            Json(ErrorBody {
                error: self.client_message(),
            }),
        )
            .into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Erro na remoção do produto", Some(&[("operation", "Remove")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
