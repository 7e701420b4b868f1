//! Remote catalog and stock API client.
//!
//! # Architecture
//!
//! - The catalog is the source of truth for products and inventory - NO local
//!   sync, direct API calls
//! - Cart operations go through the [`CatalogService`] trait so the store can
//!   be exercised against an in-memory catalog in tests
//! - Product metadata is cached in-memory via `moka` (5 minute TTL); stock is
//!   always fetched fresh
//!
//! # Endpoints
//!
//! ```text
//! GET /products       - full product listing
//! GET /products/{id}  - one product, 404 if unknown
//! GET /stock/{id}     - current stock level, 404 if unknown
//! ```

mod cache;
mod http;

pub use http::HttpCatalog;

use async_trait::async_trait;
use thiserror::Error;

use shoebox_core::{Product, ProductId, StockInfo};

/// Errors that can occur when interacting with the catalog API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Product or stock record not found.
    #[error("Not found: product {0}")]
    NotFound(ProductId),
}

/// Read access to the remote catalog and stock levels.
///
/// The cart store holds this as `Arc<dyn CatalogService>`; production wires
/// in [`HttpCatalog`], tests wire in an in-memory fake.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch one product by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id, or a transport
    /// error variant if the request fails.
    async fn product(&self, id: ProductId) -> Result<Product, CatalogError>;

    /// Fetch the current stock level for a product.
    ///
    /// Never served from cache: the caller is about to validate a cart
    /// mutation against the returned amount.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id, or a transport
    /// error variant if the request fails.
    async fn stock(&self, id: ProductId) -> Result<StockInfo, CatalogError>;

    /// Fetch the full product listing.
    ///
    /// # Errors
    ///
    /// Returns a transport error variant if the request fails.
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;
}
