//! Cart reconciliation engine.
//!
//! Owns every cart business rule: stock validation, add-or-increment,
//! derived totals and the session→user merge performed at login. Storage and
//! catalog access are injected through [`CartStore`] and [`ProductCatalog`];
//! the engine itself holds no state between calls.
//!
//! Each mutating operation is one load → mutate → persist cycle. Concurrent
//! calls for the same owner are not serialized against each other.

pub mod error;

use tracing::instrument;

use cartwheel_core::{Owner, ProductId, SessionKey, StockPolicy, UserId};

pub use error::CartError;

use crate::db::{CartStore, ProductCatalog};
use crate::models::{
    Cart, CartSummary, CatalogProduct, LineChange, LineSummary, MAX_LINE_QUANTITY, ProductSnapshot,
};

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;

/// Cart business rules over injected storage and catalog collaborators.
#[derive(Debug, Clone)]
pub struct CartEngine<S, C> {
    store: S,
    catalog: C,
    policy: StockPolicy,
}

impl<S, C> CartEngine<S, C>
where
    S: CartStore,
    C: ProductCatalog,
{
    /// Create an engine.
    #[must_use]
    pub const fn new(store: S, catalog: C, policy: StockPolicy) -> Self {
        Self {
            store,
            catalog,
            policy,
        }
    }

    /// The cart store this engine writes to.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// The stock policy in effect.
    #[must_use]
    pub const fn policy(&self) -> StockPolicy {
        self.policy
    }

    /// Return the owner's active cart, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store fails.
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn get_or_create_cart(&self, owner: &Owner) -> Result<Cart> {
        if let Some(cart) = self.store.find_active(owner).await? {
            return Ok(cart);
        }

        let cart = self.store.create(owner).await?;
        tracing::debug!(cart_id = %cart.id, "Created cart");
        Ok(cart)
    }

    /// Add `quantity` units of a product, incrementing an existing line.
    ///
    /// A new line snapshots the current catalog price; an existing line keeps
    /// the price it was created with.
    ///
    /// Under [`StockPolicy::Increment`] only `quantity` is compared with
    /// available stock, so repeated adds may take a line past the stock
    /// level. [`StockPolicy::Cumulative`] compares the resulting line
    /// quantity instead.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if `quantity` is 0 or the line would exceed
    ///   [`MAX_LINE_QUANTITY`]
    /// - `ProductNotFound` if the catalog has no such product
    /// - `InsufficientStock` if the stock check fails
    /// - `Store` if the store fails
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn add_item(
        &self,
        owner: &Owner,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<LineChange> {
        if quantity == 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CartError::InvalidQuantity(i64::from(quantity)));
        }

        let product = self.product(product_id).await?;

        let existing = self.store.find_active(owner).await?;
        let current = existing
            .as_ref()
            .and_then(|c| c.line(product_id))
            .map_or(0, |l| l.quantity);
        self.check_stock(&product, current, quantity)?;

        let mut cart = match existing {
            Some(cart) => cart,
            None => self.store.create(owner).await?,
        };

        let line = cart.add_or_increment(product_id, quantity, product.price)?;
        self.store.save(&cart).await?;

        tracing::debug!(cart_id = %cart.id, quantity = line.quantity, "Added item");
        Ok(LineChange {
            cart,
            line: Some(line),
        })
    }

    /// Set a line's quantity.
    ///
    /// A quantity of zero or less removes the line. Increases are checked
    /// against stock according to the engine's [`StockPolicy`]; decreases
    /// never consult the catalog.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if the cart has no line for the product
    /// - `ProductNotFound` if an increase targets a product missing from the catalog
    /// - `InsufficientStock` if an increase fails the stock check
    /// - `InvalidQuantity` if `quantity` does not fit a line quantity
    /// - `Store` if the store fails
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn update_quantity(
        &self,
        owner: &Owner,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<LineChange> {
        if quantity <= 0 {
            let cart = self.remove_item(owner, product_id).await?;
            return Ok(LineChange { cart, line: None });
        }

        let quantity = u32::try_from(quantity)
            .ok()
            .filter(|q| *q <= MAX_LINE_QUANTITY)
            .ok_or(CartError::InvalidQuantity(quantity))?;

        let mut cart = self
            .store
            .find_active(owner)
            .await?
            .ok_or(CartError::ItemNotFound(product_id))?;
        let current = cart
            .line(product_id)
            .ok_or(CartError::ItemNotFound(product_id))?
            .quantity;

        if quantity > current {
            let product = self.product(product_id).await?;
            self.check_stock(&product, current, quantity - current)?;
        }

        let line = cart
            .set_quantity(product_id, quantity)
            .ok_or(CartError::ItemNotFound(product_id))?;
        self.store.save(&cart).await?;

        Ok(LineChange {
            cart,
            line: Some(line),
        })
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if there is no cart or no line for the product
    /// - `Store` if the store fails
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn remove_item(&self, owner: &Owner, product_id: ProductId) -> Result<Cart> {
        let mut cart = self
            .store
            .find_active(owner)
            .await?
            .ok_or(CartError::ItemNotFound(product_id))?;

        cart.remove_line(product_id)
            .ok_or(CartError::ItemNotFound(product_id))?;
        self.store.save(&cart).await?;

        Ok(cart)
    }

    /// Remove every line from the owner's cart. Clearing an empty cart is a
    /// no-op that still succeeds.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the store fails.
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn clear_cart(&self, owner: &Owner) -> Result<Cart> {
        let mut cart = self.get_or_create_cart(owner).await?;
        cart.clear();
        self.store.save(&cart).await?;
        Ok(cart)
    }

    /// Fold an anonymous session's cart into a user's cart at login.
    ///
    /// | session cart | user cart | outcome |
    /// |---|---|---|
    /// | yes | no | session cart is handed to the user |
    /// | yes | yes | lines merged into the user cart, session cart deleted |
    /// | no | yes | user cart returned unchanged |
    /// | no | no | fresh empty user cart |
    ///
    /// When both carts hold the same product, quantities are summed and the
    /// user cart's price snapshot wins.
    ///
    /// Afterwards the user has exactly one active cart and the session has none.
    ///
    /// # Errors
    ///
    /// - `InvalidQuantity` if a summed line would exceed [`MAX_LINE_QUANTITY`]
    /// - `Store` if the store fails
    ///
    /// The merge is persisted atomically, so a failure leaves both carts as
    /// they were.
    #[instrument(skip(self, session_key), fields(session = %session_key))]
    pub async fn merge_session_into_user(
        &self,
        session_key: &SessionKey,
        user_id: UserId,
    ) -> Result<Cart> {
        let session_cart = self.store.find_active_by_session(session_key).await?;
        let user_cart = self.store.find_active_by_user(user_id).await?;

        let cart = match (session_cart, user_cart) {
            (Some(mut session_cart), None) => {
                session_cart.reassign(Owner::User(user_id));
                self.store.save(&session_cart).await?;
                tracing::info!(cart_id = %session_cart.id, "Reassigned session cart to user");
                session_cart
            }
            (Some(session_cart), Some(mut user_cart)) => {
                user_cart.absorb(&session_cart)?;
                self.store.save_merged(&user_cart, &session_cart).await?;
                tracing::info!(
                    cart_id = %user_cart.id,
                    absorbed_cart_id = %session_cart.id,
                    lines = session_cart.lines.len(),
                    "Merged session cart into user cart"
                );
                user_cart
            }
            (None, Some(user_cart)) => user_cart,
            (None, None) => self.store.create_for_user(user_id).await?,
        };

        Ok(cart)
    }

    /// Totals and lines for the owner's cart, without creating one.
    ///
    /// Owners without an active cart get [`CartSummary::empty`]. Product
    /// snapshots are filled from the catalog on a best-effort basis.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the cart store fails. Catalog failures
    /// only drop the affected snapshot.
    #[instrument(skip(self, owner), fields(owner = %owner))]
    pub async fn get_summary(&self, owner: &Owner) -> Result<CartSummary> {
        let Some(cart) = self.store.find_active(owner).await? else {
            return Ok(CartSummary::empty());
        };

        let mut summary = cart.summary();
        for item in &mut summary.items {
            item.product_snapshot = self.snapshot_for(item).await;
        }

        Ok(summary)
    }

    async fn snapshot_for(&self, item: &LineSummary) -> Option<ProductSnapshot> {
        match self.catalog.find_product(item.product_id).await {
            Ok(Some(product)) => Some(product.snapshot()),
            Ok(None) => {
                tracing::warn!(product_id = %item.product_id, "Cart line references unknown product");
                None
            }
            Err(e) => {
                tracing::warn!(product_id = %item.product_id, "Catalog lookup failed: {e}");
                None
            }
        }
    }

    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct> {
        self.catalog
            .find_product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))
    }

    fn check_stock(&self, product: &CatalogProduct, current: u32, increment: u32) -> Result<()> {
        let requested = match self.policy {
            StockPolicy::Increment => u64::from(increment),
            StockPolicy::Cumulative => u64::from(current) + u64::from(increment),
        };

        if requested > u64::from(product.available_stock) {
            return Err(CartError::InsufficientStock {
                product_id: product.id,
                requested,
                available: product.available_stock,
            });
        }

        Ok(())
    }
}
