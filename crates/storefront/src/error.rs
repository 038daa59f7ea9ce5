//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers return `Result<T, AppError>`.
//!
//! Error bodies are JSON: `{"error": {"kind": "...", "message": "..."}}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::cart::CartError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Cart operation failed.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Identity lookup or other storage access failed.
    #[error("Store error: {0}")]
    Store(#[from] RepositoryError),

    /// Bearer token did not resolve to a user.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Debug, Serialize)]
struct ErrorDetail<'a> {
    kind: &'a str,
    message: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Cart(err) => match err {
                CartError::ProductNotFound(_) | CartError::ItemNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                CartError::InsufficientStock { .. }
                | CartError::Store(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
                CartError::InvalidQuantity(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CartError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::Store(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Cart(err) => err.kind(),
            Self::Store(RepositoryError::Conflict(_)) => "cart_conflict",
            Self::Store(_) => "store_unavailable",
            Self::Unauthorized(_) => "unauthorized",
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal",
        }
    }

    const fn is_server_error(&self) -> bool {
        match self {
            Self::Cart(CartError::Store(RepositoryError::Conflict(_)))
            | Self::Store(RepositoryError::Conflict(_)) => false,
            Self::Cart(CartError::Store(_)) | Self::Store(_) | Self::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose storage details to clients
        let message = match &self {
            Self::Cart(CartError::Store(RepositoryError::Conflict(_)))
            | Self::Store(RepositoryError::Conflict(_)) => {
                "Cart was changed by a concurrent request; retry".to_string()
            }
            Self::Cart(CartError::Store(_)) | Self::Store(_) => {
                "Cart storage is temporarily unavailable".to_string()
            }
            Self::Internal(_) => "Internal server error".to_string(),
            Self::Cart(err) => err.to_string(),
            Self::Unauthorized(msg) | Self::BadRequest(msg) => msg.clone(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.kind(),
                message,
            },
        };

        (self.status(), Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after a bearer token resolves so errors are associated with the user.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cartwheel_core::ProductId;

    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::BadRequest("missing owner".to_string());
        assert_eq!(err.to_string(), "Bad request: missing owner");

        let err = AppError::Cart(CartError::ItemNotFound(ProductId::new(3)));
        assert_eq!(err.to_string(), "product 3 is not in the cart");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(CartError::ProductNotFound(ProductId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(CartError::ItemNotFound(ProductId::new(1)).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(
                CartError::InsufficientStock {
                    product_id: ProductId::new(1),
                    requested: 3,
                    available: 1,
                }
                .into()
            ),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(CartError::InvalidQuantity(0).into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(CartError::Store(RepositoryError::NotFound).into()),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_kind_matches_cart_error() {
        let err = AppError::from(CartError::InvalidQuantity(-1));
        assert_eq!(err.kind(), "invalid_quantity");
        assert_eq!(AppError::Store(RepositoryError::NotFound).kind(), "store_unavailable");
    }

    #[tokio::test]
    async fn test_store_conflict_is_retryable_conflict() {
        let err = AppError::from(CartError::Store(RepositoryError::Conflict(
            "owner already has an active cart".to_string(),
        )));
        assert_eq!(err.kind(), "cart_conflict");
        assert!(!err.is_server_error());

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["kind"], "cart_conflict");
        assert!(!json["error"]["message"].as_str().unwrap().contains("owner"));

        assert_eq!(
            get_status(AppError::Store(RepositoryError::Conflict("x".to_string()))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Store(RepositoryError::Unavailable("x".to_string()))),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
