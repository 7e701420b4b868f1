//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health        - Liveness check
//! GET  /health/ready  - Readiness check (catalog reachable)
//!
//! # Products
//! GET  /products      - Catalog listing with per-product cart amounts
//!
//! # Cart (JSON in/out)
//! GET  /cart          - Current cart view
//! POST /cart/add      - Add one unit of a product
//! POST /cart/update   - Set a product's amount
//! POST /cart/remove   - Remove a product
//! GET  /cart/count    - Cart item count (badge)
//! ```

pub mod cart;
pub mod products;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create all feature routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .nest("/cart", cart_routes())
}

/// Build the complete application router, health endpoints included.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies catalog connectivity before returning OK.
/// Returns 503 Service Unavailable if the catalog is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.catalog().products().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
