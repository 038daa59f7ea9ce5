//! Cart route handlers.
//!
//! Thin JSON wrappers around [`crate::services::cart::CartEngine`]. The cart
//! owner comes from the [`CartOwner`] extractor; every business rule lives in
//! the engine.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cartwheel_core::{CartId, CartStatus, Owner, Price, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::{CartOwner, MergeIdentity};
use crate::models::{Cart, CartSummary, LineChange, LineSummary};
use crate::services::cart::CartError;
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Body of `POST /api/cart/items`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    /// Defaults to 1.
    pub quantity: Option<i64>,
}

/// Body of `PATCH /api/cart/items/{product_id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// A cart as returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub id: CartId,
    pub owner: Owner,
    pub status: CartStatus,
    pub item_count: u64,
    pub total: Price,
    pub items: Vec<LineSummary>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        let summary = cart.summary();
        Self {
            id: cart.id,
            owner: cart.owner.clone(),
            status: cart.status,
            item_count: summary.item_count,
            total: summary.total,
            items: summary.items,
            created_at: cart.created_at,
            modified_at: cart.modified_at,
        }
    }
}

/// Result of a line mutation; `line` is omitted when the line was removed.
#[derive(Debug, Serialize)]
pub struct LineChangeResponse {
    pub cart: CartResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineSummary>,
}

impl From<LineChange> for LineChangeResponse {
    fn from(change: LineChange) -> Self {
        Self {
            cart: CartResponse::from(&change.cart),
            line: change.line.as_ref().map(LineSummary::from),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/cart` - the owner's cart, created lazily.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CartOwner(owner): CartOwner,
) -> Result<Json<CartResponse>> {
    let cart = state.engine().get_or_create_cart(&owner).await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// `GET /api/cart/summary` - totals and lines; never creates a cart.
#[instrument(skip(state))]
pub async fn summary(
    State(state): State<AppState>,
    CartOwner(owner): CartOwner,
) -> Result<Json<CartSummary>> {
    let summary = state.engine().get_summary(&owner).await?;
    Ok(Json(summary))
}

/// `POST /api/cart/items` - add a product or increment its line.
#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    CartOwner(owner): CartOwner,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<LineChangeResponse>> {
    let requested = req.quantity.unwrap_or(1);
    let quantity = u32::try_from(requested)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(AppError::Cart(CartError::InvalidQuantity(requested)))?;

    let change = state
        .engine()
        .add_item(&owner, req.product_id, quantity)
        .await?;
    Ok(Json(change.into()))
}

/// `PATCH /api/cart/items/{product_id}` - set a line's quantity; zero or
/// less removes the line.
#[instrument(skip(state))]
pub async fn update_item(
    State(state): State<AppState>,
    CartOwner(owner): CartOwner,
    Path(product_id): Path<ProductId>,
    Json(req): Json<UpdateQuantityRequest>,
) -> Result<Json<LineChangeResponse>> {
    let change = state
        .engine()
        .update_quantity(&owner, product_id, req.quantity)
        .await?;
    Ok(Json(change.into()))
}

/// `DELETE /api/cart/items/{product_id}` - remove a line.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    CartOwner(owner): CartOwner,
    Path(product_id): Path<ProductId>,
) -> Result<Json<CartResponse>> {
    let cart = state.engine().remove_item(&owner, product_id).await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// `DELETE /api/cart` - empty the cart.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    CartOwner(owner): CartOwner,
) -> Result<Json<CartResponse>> {
    let cart = state.engine().clear_cart(&owner).await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// `POST /api/cart/merge` - fold the session's cart into the user's at login.
#[instrument(skip(state))]
pub async fn merge(
    State(state): State<AppState>,
    identity: MergeIdentity,
) -> Result<Json<CartResponse>> {
    let cart = state
        .engine()
        .merge_session_into_user(&identity.session_key, identity.user_id)
        .await?;
    Ok(Json(CartResponse::from(&cart)))
}
