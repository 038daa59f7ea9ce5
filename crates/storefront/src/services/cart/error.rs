//! Cart engine error types.

use thiserror::Error;

use cartwheel_core::ProductId;

use crate::db::RepositoryError;
use crate::models::QuantityOverflow;

/// Errors that can occur during cart operations.
///
/// Every variant except `Store` leaves the cart untouched.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced product has no catalog entry.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The requested quantity exceeds available stock.
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// The cart has no line for the product.
    #[error("product {0} is not in the cart")]
    ItemNotFound(ProductId),

    /// Quantity outside the accepted range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Repository/database error.
    #[error("store unavailable: {0}")]
    Store(#[from] RepositoryError),
}

impl From<QuantityOverflow> for CartError {
    fn from(err: QuantityOverflow) -> Self {
        Self::InvalidQuantity(err.0)
    }
}

impl CartError {
    /// Stable machine-readable code for this error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ProductNotFound(_) => "product_not_found",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::ItemNotFound(_) => "item_not_found",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::Store(RepositoryError::Conflict(_)) => "cart_conflict",
            Self::Store(_) => "store_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(
            CartError::ProductNotFound(ProductId::new(1)).kind(),
            "product_not_found"
        );
        assert_eq!(
            CartError::ItemNotFound(ProductId::new(1)).kind(),
            "item_not_found"
        );
        assert_eq!(
            CartError::Store(RepositoryError::NotFound).kind(),
            "store_unavailable"
        );
        assert_eq!(
            CartError::Store(RepositoryError::Conflict("taken".to_string())).kind(),
            "cart_conflict"
        );
    }

    #[test]
    fn test_quantity_overflow_is_invalid_quantity() {
        let err = CartError::from(QuantityOverflow(4_294_967_296));
        assert!(matches!(err, CartError::InvalidQuantity(4_294_967_296)));
    }

    #[test]
    fn test_insufficient_stock_message() {
        let err = CartError::InsufficientStock {
            product_id: ProductId::new(4),
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product 4: requested 5, available 2"
        );
    }
}
