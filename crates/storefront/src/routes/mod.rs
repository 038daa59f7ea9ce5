//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                        - Liveness check
//! GET    /health/ready                  - Readiness check (store ping)
//!
//! # Cart (JSON; owner from Authorization bearer or X-Session-Key)
//! GET    /api/cart                      - Current cart, created lazily
//! DELETE /api/cart                      - Clear cart
//! GET    /api/cart/summary              - Totals and lines, never creates a cart
//! POST   /api/cart/items                - Add item {productId, quantity?}
//! PATCH  /api/cart/items/{product_id}   - Set quantity {quantity}; <= 0 removes
//! DELETE /api/cart/items/{product_id}   - Remove item
//! POST   /api/cart/merge                - Merge session cart into user cart (bearer + session key)
//! ```

pub mod cart;
pub mod health;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::state::AppState;

/// Create the cart API router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/summary", get(cart::summary))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{product_id}",
            patch(cart::update_item).delete(cart::remove_item),
        )
        .route("/merge", post(cart::merge))
}

/// Create all application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api/cart", cart_routes())
}
