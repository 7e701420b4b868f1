//! Catalog and cart domain types.
//!
//! `Product` and `StockInfo` mirror the remote catalog's wire format.
//! `CartEntry` is what the cart store holds and persists: the product fields
//! flattened beside the held quantity, so a persisted cart is a flat JSON
//! array of product-plus-amount objects.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A product as served by the remote catalog.
///
/// Immutable from the storefront's perspective; the catalog is the source of
/// truth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog product ID.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Unit price.
    pub price: Decimal,
    /// Product image URL.
    pub image: String,
}

/// Available inventory for a product.
///
/// Independent of any cart state; `amount` is what the warehouse has, not
/// what remains after subtracting carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInfo {
    /// Catalog product ID.
    pub id: ProductId,
    /// Units available for purchase.
    pub amount: u32,
}

/// A product held in the cart together with its quantity.
///
/// Invariants maintained by the cart store: at most one entry per product id,
/// `amount >= 1`, and `amount` never exceeds the stock level observed at
/// mutation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    /// The product this entry holds.
    #[serde(flatten)]
    pub product: Product,
    /// Units of the product in the cart.
    pub amount: u32,
}

impl CartEntry {
    /// Create an entry holding `amount` units of `product`.
    #[must_use]
    pub const fn new(product: Product, amount: u32) -> Self {
        Self { product, amount }
    }

    /// The product id this entry is keyed by.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Line subtotal: unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price * Decimal::from(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: ProductId::new(1),
            title: "Lightweight Walking Sneaker".to_string(),
            price: Decimal::new(17990, 2),
            image: "https://cdn.example.com/shoes/walking.jpg".to_string(),
        }
    }

    #[test]
    fn test_cart_entry_subtotal() {
        let entry = CartEntry::new(sample_product(), 3);
        assert_eq!(entry.subtotal(), Decimal::new(53970, 2));
    }

    #[test]
    fn test_cart_entry_serializes_flat() {
        let entry = CartEntry::new(sample_product(), 2);
        let value = serde_json::to_value(&entry).expect("serialize");

        // Product fields sit beside `amount`, not nested under `product`.
        assert_eq!(value["id"], 1);
        assert_eq!(value["amount"], 2);
        assert!(value.get("product").is_none());
    }

    #[test]
    fn test_cart_entry_round_trip() {
        let entry = CartEntry::new(sample_product(), 5);
        let json = serde_json::to_string(&entry).expect("serialize");
        let back: CartEntry = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, entry);
    }

    #[test]
    fn test_product_deserializes_from_catalog_payload() {
        let payload = r#"{
            "id": 2,
            "title": "Leather Trail Runner",
            "price": 139.9,
            "image": "https://cdn.example.com/shoes/vr-walking.jpg"
        }"#;

        let product: Product = serde_json::from_str(payload).expect("deserialize");
        assert_eq!(product.id, ProductId::new(2));
        assert_eq!(product.price, Decimal::new(1399, 1));
    }
}
