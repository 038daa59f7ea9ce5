//! Persistence for carts, the product catalog and API tokens.
//!
//! # Database: `cartwheel`
//!
//! ## Tables (schema `storefront`)
//!
//! - `product` - Catalog entries (price, available stock)
//! - `cart` - One row per cart, owned by exactly one user or session
//! - `cart_line` - Lines of a cart, cascade-deleted with the cart
//! - `api_token` - SHA-256 hashes of bearer tokens
//!
//! # Backends
//!
//! Every collaborator has a `PostgreSQL` adapter and an in-memory adapter.
//! [`backend`] wraps both behind enums selected by `CART_BACKEND`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p cartwheel-cli -- migrate
//! ```

pub mod backend;
pub mod carts;
pub mod memory;
pub mod products;
pub mod store;
pub mod tokens;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use backend::{Backends, CartBackend, CatalogBackend, IdentityBackend};
pub use carts::PgCartStore;
pub use memory::{MemoryCartStore, MemoryCatalog, MemoryIdentityResolver};
pub use products::PgProductCatalog;
pub use store::{CartStore, IdentityResolver, ProductCatalog};
pub use tokens::PgIdentityResolver;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second active cart for one owner).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The backing store cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(what.to_owned());
    }
    RepositoryError::Database(e)
}
