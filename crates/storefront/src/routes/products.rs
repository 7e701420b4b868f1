//! Product listing route handler.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use shoebox_core::Product;

use crate::error::Result;
use crate::state::AppState;

/// A catalog product joined with the amount of it currently in the cart.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListingView {
    #[serde(flatten)]
    pub product: Product,
    pub cart_amount: u32,
}

/// Return the full catalog listing with per-product cart amounts.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<ProductListingView>>> {
    let products = state.catalog().products().await?;
    let amounts = state.cart().amounts().await;

    let listings = products
        .into_iter()
        .map(|product| {
            let cart_amount = amounts.get(&product.id).copied().unwrap_or(0);
            ProductListingView {
                product,
                cart_amount,
            }
        })
        .collect();

    Ok(Json(listings))
}
