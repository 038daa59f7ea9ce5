//! Runtime selection between `PostgreSQL` and in-memory adapters.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use cartwheel_core::{ProductId, SessionKey, UserId};

use super::RepositoryError;
use super::memory::{MemoryCartStore, MemoryCatalog, MemoryIdentityResolver};
use super::store::{CartStore, IdentityResolver, ProductCatalog};
use super::{PgCartStore, PgIdentityResolver, PgProductCatalog};
use crate::models::{Cart, CatalogProduct};

/// Cart store chosen at startup.
#[derive(Debug, Clone)]
pub enum CartBackend {
    Postgres(PgCartStore),
    Memory(MemoryCartStore),
}

/// Product catalog chosen at startup.
#[derive(Debug, Clone)]
pub enum CatalogBackend {
    Postgres(PgProductCatalog),
    Memory(MemoryCatalog),
}

/// Identity resolver chosen at startup.
#[derive(Debug, Clone)]
pub enum IdentityBackend {
    Postgres(PgIdentityResolver),
    Memory(MemoryIdentityResolver),
}

/// The three collaborators, all backed by the same kind of storage.
#[derive(Debug, Clone)]
pub struct Backends {
    pub carts: CartBackend,
    pub catalog: CatalogBackend,
    pub identity: IdentityBackend,
}

impl Backends {
    /// All collaborators backed by one `PostgreSQL` pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            carts: CartBackend::Postgres(PgCartStore::new(pool.clone())),
            catalog: CatalogBackend::Postgres(PgProductCatalog::new(pool.clone())),
            identity: IdentityBackend::Postgres(PgIdentityResolver::new(pool.clone())),
        }
    }

    /// All collaborators in memory.
    #[must_use]
    pub fn memory(
        carts: MemoryCartStore,
        catalog: MemoryCatalog,
        identity: MemoryIdentityResolver,
    ) -> Self {
        Self {
            carts: CartBackend::Memory(carts),
            catalog: CatalogBackend::Memory(catalog),
            identity: IdentityBackend::Memory(identity),
        }
    }
}

impl CartStore for CartBackend {
    async fn find_active_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        match self {
            Self::Postgres(s) => s.find_active_by_user(user_id).await,
            Self::Memory(s) => s.find_active_by_user(user_id).await,
        }
    }

    async fn find_active_by_session(
        &self,
        session_key: &SessionKey,
    ) -> Result<Option<Cart>, RepositoryError> {
        match self {
            Self::Postgres(s) => s.find_active_by_session(session_key).await,
            Self::Memory(s) => s.find_active_by_session(session_key).await,
        }
    }

    async fn create_for_user(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        match self {
            Self::Postgres(s) => s.create_for_user(user_id).await,
            Self::Memory(s) => s.create_for_user(user_id).await,
        }
    }

    async fn create_for_session(&self, session_key: &SessionKey) -> Result<Cart, RepositoryError> {
        match self {
            Self::Postgres(s) => s.create_for_session(session_key).await,
            Self::Memory(s) => s.create_for_session(session_key).await,
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(s) => s.save(cart).await,
            Self::Memory(s) => s.save(cart).await,
        }
    }

    async fn delete(&self, cart: &Cart) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(s) => s.delete(cart).await,
            Self::Memory(s) => s.delete(cart).await,
        }
    }

    async fn save_merged(&self, target: &Cart, absorbed: &Cart) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(s) => s.save_merged(target, absorbed).await,
            Self::Memory(s) => s.save_merged(target, absorbed).await,
        }
    }

    async fn mark_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        match self {
            Self::Postgres(s) => s.mark_abandoned_before(cutoff).await,
            Self::Memory(s) => s.mark_abandoned_before(cutoff).await,
        }
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(s) => s.ping().await,
            Self::Memory(s) => s.ping().await,
        }
    }
}

impl ProductCatalog for CatalogBackend {
    async fn find_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<CatalogProduct>, RepositoryError> {
        match self {
            Self::Postgres(c) => c.find_product(product_id).await,
            Self::Memory(c) => c.find_product(product_id).await,
        }
    }
}

impl IdentityResolver for IdentityBackend {
    async fn resolve_bearer(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        match self {
            Self::Postgres(r) => r.resolve_bearer(token).await,
            Self::Memory(r) => r.resolve_bearer(token).await,
        }
    }
}
