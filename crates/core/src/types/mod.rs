//! Core types for Shoebox.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod product;

pub use id::*;
pub use product::{CartEntry, Product, StockInfo};
