//! Cart route handlers.
//!
//! Mutation routes return the updated cart view on success so the client can
//! re-render without a second round trip. Failures come back as a JSON
//! notification body via `AppError`.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use shoebox_core::{CartEntry, ProductId};

use crate::error::Result;
use crate::state::AppState;

/// Cart line display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartItemView {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub image: String,
    pub amount: u32,
    pub subtotal: Decimal,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: Decimal,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Decimal::ZERO,
            item_count: 0,
        }
    }

    fn from_entries(entries: &[CartEntry]) -> Self {
        Self {
            items: entries.iter().map(CartItemView::from).collect(),
            total: entries.iter().map(CartEntry::subtotal).sum(),
            item_count: entries.iter().map(|entry| entry.amount).sum(),
        }
    }
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.id(),
            title: entry.product.title.clone(),
            price: entry.product.price,
            image: entry.product.image.clone(),
            amount: entry.amount,
            subtotal: entry.subtotal(),
        }
    }
}

/// Cart count badge data.
#[derive(Debug, Clone, Serialize)]
pub struct CartCountView {
    pub count: u32,
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

/// Update cart request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub product_id: ProductId,
    pub amount: u32,
}

/// Remove from cart request body.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub product_id: ProductId,
}

async fn current_view(state: &AppState) -> CartView {
    CartView::from_entries(&state.cart().entries().await)
}

/// Return the current cart.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Json<CartView> {
    Json(current_view(&state).await)
}

/// Add one unit of a product to the cart.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(form): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    state.cart().add_product(form.product_id).await?;
    Ok(Json(current_view(&state).await))
}

/// Set the amount of a product already in the cart.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Json(form): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    state
        .cart()
        .update_product_amount(form.product_id, form.amount)
        .await?;
    Ok(Json(current_view(&state).await))
}

/// Remove a product from the cart.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(form): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    state.cart().remove_product(form.product_id).await?;
    Ok(Json(current_view(&state).await))
}

/// Return the cart item count (badge).
#[instrument(skip(state))]
pub async fn count(State(state): State<AppState>) -> Json<CartCountView> {
    Json(CartCountView {
        count: state.cart().item_count().await,
    })
}
