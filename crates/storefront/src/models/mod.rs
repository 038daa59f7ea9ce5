//! Domain models for the storefront.
//!
//! These types are validated domain objects, separate from database row types.
//! Business rules live in [`crate::services::cart`]; the helpers here only
//! keep a cart's own invariants (one line per product, quantity >= 1).

pub mod cart;
pub mod product;

pub use cart::{
    Cart, CartLine, CartSummary, LineChange, LineSummary, MAX_LINE_QUANTITY, ProductSnapshot,
    QuantityOverflow,
};
pub use product::{CatalogProduct, CatalogSeed};
