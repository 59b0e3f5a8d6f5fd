//! Catalog API client for stock and product lookups.
//!
//! # Endpoints
//!
//! ```text
//! GET <base>/stock/{id}     -> { "id": 7, "amount": 3 }
//! GET <base>/products/{id}  -> { "id": 7, "title": "...", "price": 179.9, "image": "..." }
//! ```
//!
//! No caching, no retries and no request timeout: every call is one round trip
//! and its answer is used only for the operation that asked.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use rocketshoes_core::{Catalog, CatalogError, Product, ProductId, StockReading};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogConfig;

/// Maximum characters of an error body kept in [`CatalogError::Api`].
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the catalog API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| CatalogError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::Transport(Box::new(e)))?;

        // `Url::join` replaces the last path segment unless the base ends in '/'.
        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// Base URL that lookups are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, resource: &str, id: ProductId) -> Result<Url, CatalogError> {
        self.inner
            .base_url
            .join(&format!("{resource}/{id}"))
            .map_err(|e| CatalogError::Parse(format!("Invalid endpoint URL: {e}")))
    }

    /// GET a JSON document describing product `id`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        id: ProductId,
    ) -> Result<T, CatalogError> {
        let response = self
            .inner
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(Box::new(e)))?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(id));
        }

        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(Box::new(e)))?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse catalog response"
            );
            CatalogError::Parse(e.to_string())
        })
    }
}

#[async_trait]
impl Catalog for ApiClient {
    #[instrument(skip(self))]
    async fn stock(&self, id: ProductId) -> Result<StockReading, CatalogError> {
        let url = self.endpoint("stock", id)?;
        let stock: StockReading = self.get_json(url, id).await?;
        debug!(%id, available = stock.amount, "Stock reading");
        Ok(stock)
    }

    #[instrument(skip(self))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let url = self.endpoint("products", id)?;
        self.get_json(url, id).await
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
