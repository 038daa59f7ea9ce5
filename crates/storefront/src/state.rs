//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::{Backends, CartBackend, CatalogBackend, IdentityBackend};
use crate::services::cart::CartEngine;

/// The engine as wired into the HTTP layer.
pub type StorefrontEngine = CartEngine<CartBackend, CatalogBackend>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the cart engine, identity resolver and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    engine: StorefrontEngine,
    identity: IdentityBackend,
}

impl AppState {
    /// Create a new application state from configured backends.
    #[must_use]
    pub fn new(config: StorefrontConfig, backends: Backends) -> Self {
        let engine = CartEngine::new(backends.carts, backends.catalog, config.stock_policy);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                engine,
                identity: backends.identity,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the cart engine.
    #[must_use]
    pub fn engine(&self) -> &StorefrontEngine {
        &self.inner.engine
    }

    /// Get a reference to the bearer token resolver.
    #[must_use]
    pub fn identity(&self) -> &IdentityBackend {
        &self.inner.identity
    }
}
