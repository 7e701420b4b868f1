//! Cache types for catalog API responses.
//!
//! Stock levels are deliberately absent: a cached stock amount would defeat
//! the stock-limit validation the cart performs.

use shoebox_core::{Product, ProductId};

/// Cache key for product metadata.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}
