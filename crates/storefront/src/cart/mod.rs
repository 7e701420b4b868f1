//! Cart store: the authoritative in-process cart.
//!
//! # Architecture
//!
//! - One [`CartStore`] per process, owned by the application state and handed
//!   to handlers explicitly - no ambient singletons
//! - Entries live behind a `tokio::sync::RwLock`; every mutation builds a new
//!   list and swaps it in rather than mutating entries in place
//! - Each mutation validates against the remote catalog, persists the new
//!   list to the [`SnapshotStore`], then commits it to memory - so a failed
//!   persist leaves the visible cart unchanged
//! - Operations are last-write-wins; the stock check can go stale between
//!   fetch and apply, which is accepted rather than mitigated
//!
//! # Policies
//!
//! - An amount below 1 is rejected; entries leave the cart only through
//!   [`CartStore::remove_product`]
//! - Adding a product already in the cart validates stock against the
//!   incremented amount
//! - The list is kept sorted by ascending product id, so snapshots and API
//!   responses are deterministic

mod snapshot;

pub use snapshot::{SnapshotError, SnapshotStore};

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use shoebox_core::{CartEntry, ProductId};

use crate::catalog::{CatalogError, CatalogService};

/// Errors produced by cart operations.
///
/// Every failure leaves the cart unchanged; none is fatal to the process.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced product, stock record, or cart entry does not exist.
    #[error("Product {0} not found")]
    NotFound(ProductId),

    /// The requested amount exceeds the available stock.
    #[error("Requested amount for product {0} is out of stock")]
    OutOfStock(ProductId),

    /// Non-positive or unchanged amount requested, or no entry to update.
    #[error("Invalid amount: {0}")]
    InvalidAmount(u32),

    /// The catalog API failed transiently (network, parse, server error).
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Persisting the snapshot failed.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

/// The authoritative cart, mirrored to a durable snapshot.
///
/// Cheaply cloneable via `Arc`; all clones share the same entry list.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    entries: RwLock<Vec<CartEntry>>,
    snapshot: SnapshotStore,
    catalog: Arc<dyn CatalogService>,
}

impl CartStore {
    /// Restore the cart from its persisted snapshot.
    ///
    /// A missing or unparseable snapshot yields an empty cart; the store
    /// never fails to construct.
    pub async fn load(snapshot: SnapshotStore, catalog: Arc<dyn CatalogService>) -> Self {
        let entries = snapshot.load().await;
        tracing::info!(
            path = %snapshot.path().display(),
            entries = entries.len(),
            "Cart restored from snapshot"
        );

        Self {
            inner: Arc::new(CartStoreInner {
                entries: RwLock::new(entries),
                snapshot,
                catalog,
            }),
        }
    }

    /// Current cart entries, sorted by product id.
    pub async fn entries(&self) -> Vec<CartEntry> {
        self.inner.entries.read().await.clone()
    }

    /// Derived mapping from product id to cart amount, for listing display.
    pub async fn amounts(&self) -> HashMap<ProductId, u32> {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .map(|entry| (entry.id(), entry.amount))
            .collect()
    }

    /// Total units across all entries.
    pub async fn item_count(&self) -> u32 {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .map(|entry| entry.amount)
            .sum()
    }

    /// Sum of line subtotals.
    pub async fn total(&self) -> Decimal {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .map(CartEntry::subtotal)
            .sum()
    }

    /// Add one unit of a product to the cart.
    ///
    /// Inserts a new entry with amount 1, or bumps an existing entry by one
    /// (validating stock against the incremented amount).
    ///
    /// # Errors
    ///
    /// - `NotFound` if the product or its stock record is missing from the
    ///   catalog
    /// - `OutOfStock` if the cart already holds all available units
    /// - `Catalog`/`Snapshot` if validation or persistence fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add_product(&self, product_id: ProductId) -> Result<(), CartError> {
        if let Some(current) = self.amount_of(product_id).await {
            return self.update_product_amount(product_id, current + 1).await;
        }

        let product = self
            .inner
            .catalog
            .product(product_id)
            .await
            .map_err(|e| lookup_failure(product_id, e))?;
        let stock = self
            .inner
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| lookup_failure(product_id, e))?;

        if stock.amount < 1 {
            return Err(CartError::OutOfStock(product_id));
        }

        self.commit(move |entries| {
            let mut next: Vec<CartEntry> = entries.to_vec();
            next.push(CartEntry::new(product, 1));
            Ok(next)
        })
        .await
    }

    /// Remove a product's entry from the cart.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the cart holds no entry for the product
    /// - `Snapshot` if persistence fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_product(&self, product_id: ProductId) -> Result<(), CartError> {
        self.commit(move |entries| {
            if !entries.iter().any(|entry| entry.id() == product_id) {
                return Err(CartError::NotFound(product_id));
            }

            Ok(entries
                .iter()
                .filter(|entry| entry.id() != product_id)
                .cloned()
                .collect())
        })
        .await
    }

    /// Set the amount of a product already in the cart.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `amount < 1`, no entry matches, or the amount is
    ///   unchanged
    /// - `OutOfStock` if `amount` exceeds the current stock level
    /// - `Catalog`/`Snapshot` if validation or persistence fails
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn update_product_amount(
        &self,
        product_id: ProductId,
        amount: u32,
    ) -> Result<(), CartError> {
        let Some(current) = self.amount_of(product_id).await else {
            return Err(CartError::InvalidAmount(amount));
        };
        if amount < 1 || amount == current {
            return Err(CartError::InvalidAmount(amount));
        }

        let stock = self
            .inner
            .catalog
            .stock(product_id)
            .await
            .map_err(|e| lookup_failure(product_id, e))?;
        if amount > stock.amount {
            return Err(CartError::OutOfStock(product_id));
        }

        self.commit(move |entries| {
            Ok(entries
                .iter()
                .map(|entry| {
                    if entry.id() == product_id {
                        CartEntry::new(entry.product.clone(), amount)
                    } else {
                        entry.clone()
                    }
                })
                .collect())
        })
        .await
    }

    /// Current amount of a product in the cart, if present.
    async fn amount_of(&self, product_id: ProductId) -> Option<u32> {
        self.inner
            .entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id() == product_id)
            .map(|entry| entry.amount)
    }

    /// Rebuild the entry list, persist it, then swap it into memory.
    ///
    /// The snapshot write happens before the in-memory swap, so a failed
    /// persist leaves the visible cart unchanged.
    async fn commit<F>(&self, rebuild: F) -> Result<(), CartError>
    where
        F: FnOnce(&[CartEntry]) -> Result<Vec<CartEntry>, CartError>,
    {
        let mut entries = self.inner.entries.write().await;
        let mut next = rebuild(entries.as_slice())?;
        next.sort_by_key(CartEntry::id);

        self.inner.snapshot.save(&next).await?;
        *entries = next;

        Ok(())
    }
}

/// Map a catalog lookup failure onto the cart error taxonomy.
fn lookup_failure(product_id: ProductId, err: CatalogError) -> CartError {
    match err {
        CatalogError::NotFound(_) => CartError::NotFound(product_id),
        other => CartError::Catalog(other),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use shoebox_core::{Product, StockInfo};

    use super::*;

    /// In-memory catalog fake for exercising the store without a network.
    struct FakeCatalog {
        products: HashMap<ProductId, Product>,
        stock: HashMap<ProductId, u32>,
        unavailable: bool,
    }

    impl FakeCatalog {
        fn new(listings: &[(i32, u32)]) -> Self {
            let mut products = HashMap::new();
            let mut stock = HashMap::new();
            for &(id, amount) in listings {
                let id = ProductId::new(id);
                products.insert(
                    id,
                    Product {
                        id,
                        title: format!("Sneaker {id}"),
                        price: Decimal::new(12990, 2),
                        image: format!("https://cdn.example.com/shoes/{id}.jpg"),
                    },
                );
                stock.insert(id, amount);
            }
            Self {
                products,
                stock,
                unavailable: false,
            }
        }

        fn unavailable() -> Self {
            Self {
                products: HashMap::new(),
                stock: HashMap::new(),
                unavailable: true,
            }
        }
    }

    #[async_trait]
    impl CatalogService for FakeCatalog {
        async fn product(&self, id: ProductId) -> Result<Product, CatalogError> {
            if self.unavailable {
                return Err(CatalogError::Api {
                    status: 503,
                    message: "catalog down".to_string(),
                });
            }
            self.products
                .get(&id)
                .cloned()
                .ok_or(CatalogError::NotFound(id))
        }

        async fn stock(&self, id: ProductId) -> Result<StockInfo, CatalogError> {
            if self.unavailable {
                return Err(CatalogError::Api {
                    status: 503,
                    message: "catalog down".to_string(),
                });
            }
            self.stock
                .get(&id)
                .map(|&amount| StockInfo { id, amount })
                .ok_or(CatalogError::NotFound(id))
        }

        async fn products(&self) -> Result<Vec<Product>, CatalogError> {
            let mut products: Vec<Product> = self.products.values().cloned().collect();
            products.sort_by_key(|p| p.id);
            Ok(products)
        }
    }

    async fn store_with(catalog: FakeCatalog) -> (CartStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("tempdir");
        let snapshot = SnapshotStore::new(dir.path().join("cart.json"));
        let store = CartStore::load(snapshot, Arc::new(catalog)).await;
        (store, dir)
    }

    #[tokio::test]
    async fn test_add_new_product_starts_at_amount_one() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("add");

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), ProductId::new(1));
        assert_eq!(entries[0].amount, 1);
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_amount() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("first");
        store.add_product(ProductId::new(1)).await.expect("second");

        assert_eq!(store.entries().await[0].amount, 2);
    }

    #[tokio::test]
    async fn test_add_at_stock_limit_is_rejected_without_mutation() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 1)])).await;

        store.add_product(ProductId::new(1)).await.expect("add");
        let err = store
            .add_product(ProductId::new(1))
            .await
            .expect_err("stock exhausted");

        assert!(matches!(err, CartError::OutOfStock(id) if id == ProductId::new(1)));
        assert_eq!(store.entries().await[0].amount, 1);
    }

    #[tokio::test]
    async fn test_add_unknown_product_fails_not_found() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        let err = store
            .add_product(ProductId::new(99))
            .await
            .expect_err("unknown product");

        assert!(matches!(err, CartError::NotFound(id) if id == ProductId::new(99)));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_add_with_zero_stock_fails_out_of_stock() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 0)])).await;

        let err = store
            .add_product(ProductId::new(1))
            .await
            .expect_err("no stock");

        assert!(matches!(err, CartError::OutOfStock(_)));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_product_empties_entry() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5), (2, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("add 1");
        store.add_product(ProductId::new(2)).await.expect("add 2");
        store
            .remove_product(ProductId::new(1))
            .await
            .expect("remove");

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), ProductId::new(2));
    }

    #[tokio::test]
    async fn test_remove_absent_product_fails_not_found() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("add");
        let err = store
            .remove_product(ProductId::new(2))
            .await
            .expect_err("absent id");

        assert!(matches!(err, CartError::NotFound(id) if id == ProductId::new(2)));
        assert_eq!(store.entries().await.len(), 1);
    }

    #[tokio::test]
    async fn test_update_below_one_fails_invalid_amount() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("add");
        let err = store
            .update_product_amount(ProductId::new(1), 0)
            .await
            .expect_err("amount 0");

        assert!(matches!(err, CartError::InvalidAmount(0)));
        assert_eq!(store.entries().await[0].amount, 1);
    }

    #[tokio::test]
    async fn test_update_unchanged_amount_fails_invalid_amount() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("add");
        let err = store
            .update_product_amount(ProductId::new(1), 1)
            .await
            .expect_err("no-op amount");

        assert!(matches!(err, CartError::InvalidAmount(1)));
    }

    #[tokio::test]
    async fn test_update_absent_entry_fails_invalid_amount() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        let err = store
            .update_product_amount(ProductId::new(1), 2)
            .await
            .expect_err("nothing to update");

        assert!(matches!(err, CartError::InvalidAmount(2)));
    }

    #[tokio::test]
    async fn test_update_beyond_stock_fails_then_within_stock_succeeds() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(2, 3)])).await;

        store.add_product(ProductId::new(2)).await.expect("add");
        store
            .update_product_amount(ProductId::new(2), 3)
            .await
            .expect("raise to 3");

        let err = store
            .update_product_amount(ProductId::new(2), 4)
            .await
            .expect_err("beyond stock");
        assert!(matches!(err, CartError::OutOfStock(_)));
        assert_eq!(store.entries().await[0].amount, 3);

        store
            .update_product_amount(ProductId::new(2), 2)
            .await
            .expect("lower to 2");
        assert_eq!(store.entries().await[0].amount, 2);
    }

    #[tokio::test]
    async fn test_repeated_adds_stop_at_stock_limit() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5)])).await;

        for _ in 0..5 {
            store.add_product(ProductId::new(1)).await.expect("add");
        }
        assert_eq!(store.entries().await[0].amount, 5);

        let err = store
            .add_product(ProductId::new(1))
            .await
            .expect_err("sixth add");
        assert!(matches!(err, CartError::OutOfStock(_)));
        assert_eq!(store.entries().await[0].amount, 5);
    }

    #[tokio::test]
    async fn test_entries_kept_sorted_by_product_id() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5), (3, 5), (7, 5)])).await;

        store.add_product(ProductId::new(7)).await.expect("add 7");
        store.add_product(ProductId::new(1)).await.expect("add 1");
        store.add_product(ProductId::new(3)).await.expect("add 3");

        let ids: Vec<ProductId> = store.entries().await.iter().map(CartEntry::id).collect();
        assert_eq!(
            ids,
            vec![ProductId::new(1), ProductId::new(3), ProductId::new(7)]
        );
    }

    #[tokio::test]
    async fn test_amounts_and_totals_derive_from_entries() {
        let (store, _dir) = store_with(FakeCatalog::new(&[(1, 5), (2, 5)])).await;

        store.add_product(ProductId::new(1)).await.expect("add 1");
        store.add_product(ProductId::new(2)).await.expect("add 2");
        store
            .update_product_amount(ProductId::new(2), 3)
            .await
            .expect("raise 2");

        let amounts = store.amounts().await;
        assert_eq!(amounts.get(&ProductId::new(1)), Some(&1));
        assert_eq!(amounts.get(&ProductId::new(2)), Some(&3));
        assert_eq!(store.item_count().await, 4);
        // 4 units at 129.90 each
        assert_eq!(store.total().await, Decimal::new(51960, 2));
    }

    #[tokio::test]
    async fn test_snapshot_restores_across_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cart.json");

        {
            let snapshot = SnapshotStore::new(&path);
            let store = CartStore::load(snapshot, Arc::new(FakeCatalog::new(&[(1, 5)]))).await;
            store.add_product(ProductId::new(1)).await.expect("add");
            store.add_product(ProductId::new(1)).await.expect("add");
        }

        let snapshot = SnapshotStore::new(&path);
        let store = CartStore::load(snapshot, Arc::new(FakeCatalog::new(&[(1, 5)]))).await;

        let entries = store.entries().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 2);
    }

    #[tokio::test]
    async fn test_catalog_outage_is_transient_and_leaves_cart_unchanged() {
        let (store, _dir) = store_with(FakeCatalog::unavailable()).await;

        let err = store
            .add_product(ProductId::new(1))
            .await
            .expect_err("catalog down");

        assert!(matches!(err, CartError::Catalog(CatalogError::Api { status: 503, .. })));
        assert!(store.entries().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_persist_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        // Parent directory does not exist, so every save fails.
        let snapshot = SnapshotStore::new(dir.path().join("missing").join("cart.json"));
        let store = CartStore::load(snapshot, Arc::new(FakeCatalog::new(&[(1, 5)]))).await;

        let err = store
            .add_product(ProductId::new(1))
            .await
            .expect_err("unwritable snapshot");

        assert!(matches!(err, CartError::Snapshot(_)));
        assert!(store.entries().await.is_empty());
    }
}
