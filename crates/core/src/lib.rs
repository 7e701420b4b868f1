//! Shoebox Core - Shared types library.
//!
//! This crate provides the domain types used across the Shoebox components:
//! - `storefront` - Public-facing cart service
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage
//! access. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the catalog/cart
//!   domain types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
