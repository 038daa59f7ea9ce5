//! In-memory adapters for local development and tests.
//!
//! State lives behind `tokio` locks shared through `Arc`, so clones of an
//! adapter see the same data. Cart uniqueness is enforced while holding the
//! table lock.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use cartwheel_core::{CartId, CartStatus, Owner, Price, ProductId, SessionKey, UserId};

use super::RepositoryError;
use super::store::{CartStore, IdentityResolver, ProductCatalog};
use crate::models::{Cart, CatalogProduct};

#[derive(Debug, Default)]
struct CartTable {
    last_id: i32,
    carts: HashMap<CartId, Cart>,
}

impl CartTable {
    fn active_for(&self, owner: &Owner) -> Option<&Cart> {
        self.carts
            .values()
            .find(|c| c.status == CartStatus::Active && &c.owner == owner)
    }

    fn create(&mut self, owner: &Owner) -> Result<Cart, RepositoryError> {
        if let Some(existing) = self.active_for(owner) {
            return Ok(existing.clone());
        }

        self.last_id = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| RepositoryError::Unavailable("cart id space exhausted".to_owned()))?;
        let cart = Cart::new(CartId::new(self.last_id), owner.clone(), Utc::now());
        self.carts.insert(cart.id, cart.clone());
        Ok(cart)
    }

    fn upsert(&mut self, cart: &Cart) -> Result<(), RepositoryError> {
        if cart.status == CartStatus::Active
            && self
                .active_for(&cart.owner)
                .is_some_and(|other| other.id != cart.id)
        {
            return Err(RepositoryError::Conflict(
                "owner already has an active cart".to_owned(),
            ));
        }

        self.last_id = self.last_id.max(cart.id.as_i32());
        self.carts.insert(cart.id, cart.clone());
        Ok(())
    }
}

/// In-memory [`CartStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStore {
    table: Arc<Mutex<CartTable>>,
}

impl MemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored carts in any status.
    pub async fn cart_count(&self) -> usize {
        self.table.lock().await.carts.len()
    }

    /// Number of active carts for an owner. Never more than one.
    pub async fn active_cart_count(&self, owner: &Owner) -> usize {
        self.table
            .lock()
            .await
            .carts
            .values()
            .filter(|c| c.status == CartStatus::Active && &c.owner == owner)
            .count()
    }

    /// Fetch a cart by id regardless of status.
    pub async fn get(&self, id: CartId) -> Option<Cart> {
        self.table.lock().await.carts.get(&id).cloned()
    }
}

impl CartStore for MemoryCartStore {
    async fn find_active_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.active_for(&Owner::User(user_id)).cloned())
    }

    async fn find_active_by_session(
        &self,
        session_key: &SessionKey,
    ) -> Result<Option<Cart>, RepositoryError> {
        let owner = Owner::Session(session_key.clone());
        let table = self.table.lock().await;
        Ok(table.active_for(&owner).cloned())
    }

    async fn create_for_user(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        self.table.lock().await.create(&Owner::User(user_id))
    }

    async fn create_for_session(&self, session_key: &SessionKey) -> Result<Cart, RepositoryError> {
        let owner = Owner::Session(session_key.clone());
        self.table.lock().await.create(&owner)
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        self.table.lock().await.upsert(cart)
    }

    async fn delete(&self, cart: &Cart) -> Result<(), RepositoryError> {
        self.table.lock().await.carts.remove(&cart.id);
        Ok(())
    }

    async fn save_merged(&self, target: &Cart, absorbed: &Cart) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;
        let removed = table.carts.remove(&absorbed.id);

        if let Err(e) = table.upsert(target) {
            // Keep the step atomic: put the absorbed cart back.
            if let Some(cart) = removed {
                table.carts.insert(cart.id, cart);
            }
            return Err(e);
        }

        Ok(())
    }

    async fn mark_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut table = self.table.lock().await;
        let mut affected = 0;

        for cart in table.carts.values_mut() {
            if cart.status == CartStatus::Active && cart.modified_at < cutoff {
                cart.status = CartStatus::Abandoned;
                affected += 1;
            }
        }

        Ok(affected)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// In-memory [`ProductCatalog`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, CatalogProduct>>>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog pre-filled with products.
    #[must_use]
    pub fn with_products(products: impl IntoIterator<Item = CatalogProduct>) -> Self {
        let products = products.into_iter().map(|p| (p.id, p)).collect();
        Self {
            products: Arc::new(RwLock::new(products)),
        }
    }

    /// Insert or replace a product.
    pub async fn insert(&self, product: CatalogProduct) {
        self.products.write().await.insert(product.id, product);
    }

    /// Change a product's price. Returns `false` if the product is unknown.
    pub async fn set_price(&self, product_id: ProductId, price: Price) -> bool {
        self.products
            .write()
            .await
            .get_mut(&product_id)
            .map(|p| p.price = price)
            .is_some()
    }

    /// Change a product's stock. Returns `false` if the product is unknown.
    pub async fn set_stock(&self, product_id: ProductId, available_stock: u32) -> bool {
        self.products
            .write()
            .await
            .get_mut(&product_id)
            .map(|p| p.available_stock = available_stock)
            .is_some()
    }
}

impl ProductCatalog for MemoryCatalog {
    async fn find_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<CatalogProduct>, RepositoryError> {
        Ok(self.products.read().await.get(&product_id).cloned())
    }
}

/// In-memory [`IdentityResolver`] keyed by plain token.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityResolver {
    tokens: Arc<RwLock<HashMap<String, UserId>>>,
}

impl MemoryIdentityResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a resolver that knows the given token/user pairs.
    #[must_use]
    pub fn with_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = (T, UserId)>,
        T: Into<String>,
    {
        let tokens = tokens.into_iter().map(|(t, u)| (t.into(), u)).collect();
        Self {
            tokens: Arc::new(RwLock::new(tokens)),
        }
    }

    /// Register a token for a user.
    pub async fn insert(&self, token: impl Into<String>, user_id: UserId) {
        self.tokens.write().await.insert(token.into(), user_id);
    }
}

impl IdentityResolver for MemoryIdentityResolver {
    async fn resolve_bearer(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        Ok(self.tokens.read().await.get(token).copied())
    }
}
