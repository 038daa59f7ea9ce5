//! Business logic services for storefront.
//!
//! # Services
//!
//! - `cart` - Cart reconciliation engine (stock checks, totals, login merge)

pub mod cart;
