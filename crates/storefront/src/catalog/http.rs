//! HTTP implementation of the catalog client.
//!
//! Plain REST over `reqwest`. Product metadata is cached with `moka`
//! (5-minute TTL); stock lookups always hit the API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use shoebox_core::{Product, ProductId, StockInfo};

use super::cache::{CacheKey, CacheValue};
use super::{CatalogError, CatalogService};
use crate::config::CatalogConfig;

// =============================================================================
// HttpCatalog
// =============================================================================

/// Client for the remote catalog/stock REST API.
///
/// Cheaply cloneable; all clones share one HTTP connection pool and one
/// product cache.
#[derive(Clone)]
pub struct HttpCatalog {
    inner: Arc<HttpCatalogInner>,
}

struct HttpCatalogInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl HttpCatalog {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(HttpCatalogInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Execute a GET request and decode the JSON body.
    ///
    /// A 404 response maps to `NotFound` when the request addressed a single
    /// product; other non-success statuses map to `Api`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        subject: Option<ProductId>,
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{path}", self.inner.base_url);

        let response = self.inner.client.get(&url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND
            && let Some(id) = subject
        {
            return Err(CatalogError::NotFound(id));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                url = %url,
                body = %message.chars().take(200).collect::<String>(),
                "Catalog API returned non-success status"
            );
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl CatalogService for HttpCatalog {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .get_json(&format!("products/{id}"), Some(id))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    // Stock is what cart mutations are validated against, so it bypasses the
    // cache entirely.
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<StockInfo, CatalogError> {
        self.get_json(&format!("stock/{id}"), Some(id)).await
    }

    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("products", None).await?;

        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }
}
