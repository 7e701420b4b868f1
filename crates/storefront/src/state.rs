//! Application state shared across handlers.

use std::sync::Arc;

use crate::cart::{CartStore, SnapshotStore};
use crate::catalog::CatalogService;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// cart store, the catalog client, and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogService>,
    cart: CartStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Restores the cart from the snapshot path in `config`; a missing or
    /// unreadable snapshot yields an empty cart.
    pub async fn new(config: StorefrontConfig, catalog: Arc<dyn CatalogService>) -> Self {
        let snapshot = SnapshotStore::new(&config.snapshot_path);
        let cart = CartStore::load(snapshot, Arc::clone(&catalog)).await;

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                cart,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the catalog client.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.inner.catalog
    }

    /// Get a reference to the cart store.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }
}
