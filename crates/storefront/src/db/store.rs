//! Collaborator contracts used by the cart engine.
//!
//! Methods return `impl Future + Send` so engines built on any
//! implementation can be driven from axum handlers.

use std::future::Future;

use chrono::{DateTime, Utc};

use cartwheel_core::{Owner, ProductId, SessionKey, UserId};

use super::RepositoryError;
use crate::models::{Cart, CatalogProduct};

/// Persistence for carts and their lines.
///
/// Implementations guarantee at most one active cart per user and one per
/// session key. They never apply business rules.
pub trait CartStore: Send + Sync {
    /// Active cart for a user, with its lines.
    fn find_active_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Cart>, RepositoryError>> + Send;

    /// Active cart for a session, with its lines.
    fn find_active_by_session(
        &self,
        session_key: &SessionKey,
    ) -> impl Future<Output = Result<Option<Cart>, RepositoryError>> + Send;

    /// Create an empty active cart for a user.
    ///
    /// If an active cart already exists for the user it is returned instead,
    /// so concurrent lazy creation never yields two carts.
    fn create_for_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Cart, RepositoryError>> + Send;

    /// Create an empty active cart for a session. Same uniqueness rule as
    /// [`Self::create_for_user`].
    fn create_for_session(
        &self,
        session_key: &SessionKey,
    ) -> impl Future<Output = Result<Cart, RepositoryError>> + Send;

    /// Upsert the cart row and replace its lines atomically.
    fn save(&self, cart: &Cart) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a cart and, by cascade, all of its lines.
    fn delete(&self, cart: &Cart) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Persist `target` and delete `absorbed` in one atomic step.
    fn save_merged(
        &self,
        target: &Cart,
        absorbed: &Cart,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Mark active carts not modified since `cutoff` as abandoned.
    ///
    /// Returns the number of carts affected.
    fn mark_abandoned_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> impl Future<Output = Result<u64, RepositoryError>> + Send;

    /// Cheap connectivity check for readiness probes.
    fn ping(&self) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Active cart for either kind of owner.
    fn find_active(
        &self,
        owner: &Owner,
    ) -> impl Future<Output = Result<Option<Cart>, RepositoryError>> + Send {
        async move {
            match owner {
                Owner::User(user_id) => self.find_active_by_user(*user_id).await,
                Owner::Session(key) => self.find_active_by_session(key).await,
            }
        }
    }

    /// Create an empty cart for either kind of owner.
    fn create(&self, owner: &Owner) -> impl Future<Output = Result<Cart, RepositoryError>> + Send {
        async move {
            match owner {
                Owner::User(user_id) => self.create_for_user(*user_id).await,
                Owner::Session(key) => self.create_for_session(key).await,
            }
        }
    }
}

/// Read access to the product catalog.
pub trait ProductCatalog: Send + Sync {
    /// Look up a product's price and available stock.
    fn find_product(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<CatalogProduct>, RepositoryError>> + Send;
}

/// Resolves bearer credentials to users.
pub trait IdentityResolver: Send + Sync {
    /// Returns the user a bearer token belongs to, or `None` for unknown or
    /// expired tokens.
    fn resolve_bearer(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<UserId>, RepositoryError>> + Send;
}
