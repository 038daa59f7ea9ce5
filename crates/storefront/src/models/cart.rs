//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use cartwheel_core::{CartId, CartStatus, Owner, Price, ProductId};

/// Largest quantity a single line may hold (the width of the stored column).
pub const MAX_LINE_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// A line quantity would exceed [`MAX_LINE_QUANTITY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("line quantity {0} exceeds the maximum of {max}", max = MAX_LINE_QUANTITY)]
pub struct QuantityOverflow(pub i64);

fn checked_line_total(current: u32, extra: u32) -> Result<u32, QuantityOverflow> {
    current
        .checked_add(extra)
        .filter(|total| *total <= MAX_LINE_QUANTITY)
        .ok_or_else(|| QuantityOverflow(i64::from(current) + i64::from(extra)))
}

/// One product entry in a cart.
///
/// `unit_price` is captured when the line is first added and is never
/// re-synced with the catalog afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Always at least 1; a line that would drop to 0 is removed instead.
    pub quantity: u32,
    /// Price snapshot taken when the line was created.
    pub unit_price: Price,
}

impl CartLine {
    /// `quantity × unit_price`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// A shopping cart (domain type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    /// Store-assigned id.
    pub id: CartId,
    /// The user or session this cart belongs to.
    pub owner: Owner,
    /// Lifecycle status.
    pub status: CartStatus,
    /// Lines, unique by product id.
    pub lines: Vec<CartLine>,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
    /// When the cart was last mutated.
    pub modified_at: DateTime<Utc>,
}

impl Cart {
    /// Create an empty, active cart.
    #[must_use]
    pub fn new(id: CartId, owner: Owner, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            status: CartStatus::Active,
            lines: Vec::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Sum of line subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }

    /// Increment an existing line or append a new one.
    ///
    /// An existing line keeps its original `unit_price`; `unit_price` is only
    /// used when a new line is appended. `quantity` must be at least 1.
    ///
    /// # Errors
    ///
    /// Returns `QuantityOverflow` if the line would exceed
    /// [`MAX_LINE_QUANTITY`]; the cart is left unchanged.
    pub fn add_or_increment(
        &mut self,
        product_id: ProductId,
        quantity: u32,
        unit_price: Price,
    ) -> Result<CartLine, QuantityOverflow> {
        debug_assert!(quantity >= 1);
        let current = self.line(product_id).map_or(0, |l| l.quantity);
        let total = checked_line_total(current, quantity)?;
        self.touch();

        if let Some(line) = self.line_mut(product_id) {
            line.quantity = total;
            return Ok(line.clone());
        }

        let line = CartLine {
            product_id,
            quantity: total,
            unit_price,
        };
        self.lines.push(line.clone());
        Ok(line)
    }

    /// Overwrite the quantity of an existing line.
    ///
    /// Returns `None` if the cart has no line for the product. `quantity`
    /// must be at least 1; removal goes through [`Self::remove_line`].
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> Option<CartLine> {
        debug_assert!(quantity >= 1);
        let line = self.line_mut(product_id)?;
        line.quantity = quantity;
        let updated = line.clone();
        self.touch();
        Some(updated)
    }

    /// Remove the line for a product, returning it if it existed.
    pub fn remove_line(&mut self, product_id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product_id == product_id)?;
        let removed = self.lines.remove(index);
        self.touch();
        Some(removed)
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.touch();
    }

    /// Fold another cart's lines into this one.
    ///
    /// Overlapping products have their quantities summed and keep this
    /// cart's price snapshot; the other cart's snapshot is discarded.
    /// Products missing here are moved over unchanged.
    ///
    /// # Errors
    ///
    /// Returns `QuantityOverflow` if any summed line would exceed
    /// [`MAX_LINE_QUANTITY`]; the cart is left unchanged.
    pub fn absorb(&mut self, other: &Self) -> Result<(), QuantityOverflow> {
        let mut merged = self.lines.clone();
        for incoming in &other.lines {
            match merged.iter_mut().find(|l| l.product_id == incoming.product_id) {
                Some(line) => line.quantity = checked_line_total(line.quantity, incoming.quantity)?,
                None => merged.push(incoming.clone()),
            }
        }
        self.lines = merged;
        self.touch();
        Ok(())
    }

    /// Hand the cart to a new owner.
    pub fn reassign(&mut self, owner: Owner) {
        self.owner = owner;
        self.touch();
    }

    /// Summary without product snapshots.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            item_count: self.item_count(),
            total: self.total(),
            items: self.lines.iter().map(LineSummary::from).collect(),
        }
    }

    fn touch(&mut self) {
        self.modified_at = Utc::now().max(self.modified_at);
    }
}

/// Result of a line-level mutation: the updated cart plus the affected line.
///
/// `line` is `None` when the mutation removed the line.
#[derive(Debug, Clone)]
pub struct LineChange {
    pub cart: Cart,
    pub line: Option<CartLine>,
}

/// Denormalized catalog data for display. Not authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSnapshot {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One line of a [`CartSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
    pub subtotal: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_snapshot: Option<ProductSnapshot>,
}

impl From<&CartLine> for LineSummary {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id,
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal(),
            product_snapshot: None,
        }
    }
}

/// Derived totals for a cart, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub item_count: u64,
    pub total: Price,
    pub items: Vec<LineSummary>,
}

impl CartSummary {
    /// The zero-valued summary returned for owners without a cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cartwheel_core::UserId;

    fn cart() -> Cart {
        Cart::new(CartId::new(1), Owner::User(UserId::new(1)), Utc::now())
    }

    #[test]
    fn test_new_cart_is_empty_and_active() {
        let cart = cart();
        assert!(cart.is_empty());
        assert_eq!(cart.status, CartStatus::Active);
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_add_or_increment_keeps_first_price() {
        let mut cart = cart();
        cart.add_or_increment(ProductId::new(10), 2, Price::from_cents(500)).unwrap();
        let line = cart
            .add_or_increment(ProductId::new(10), 3, Price::from_cents(900))
            .unwrap();

        assert_eq!(line.quantity, 5);
        assert_eq!(line.unit_price, Price::from_cents(500));
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.total(), Price::from_cents(2500));
    }

    #[test]
    fn test_totals() {
        let mut cart = cart();
        cart.add_or_increment(ProductId::new(1), 2, Price::from_cents(150)).unwrap();
        cart.add_or_increment(ProductId::new(2), 1, Price::from_cents(1000)).unwrap();

        assert_eq!(cart.item_count(), 3);
        assert_eq!(cart.total(), Price::from_cents(1300));
    }

    #[test]
    fn test_set_quantity_missing_line() {
        let mut cart = cart();
        assert!(cart.set_quantity(ProductId::new(1), 4).is_none());
    }

    #[test]
    fn test_remove_line() {
        let mut cart = cart();
        cart.add_or_increment(ProductId::new(1), 1, Price::from_cents(100)).unwrap();

        assert!(cart.remove_line(ProductId::new(1)).is_some());
        assert!(cart.remove_line(ProductId::new(1)).is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_absorb_sums_overlap_and_moves_rest() {
        let mut user = cart();
        user.add_or_increment(ProductId::new(10), 1, Price::from_cents(500)).unwrap();

        let mut session = cart();
        session.add_or_increment(ProductId::new(10), 3, Price::from_cents(700)).unwrap();
        session.add_or_increment(ProductId::new(20), 1, Price::from_cents(900)).unwrap();

        user.absorb(&session).unwrap();

        let ten = user.line(ProductId::new(10)).unwrap();
        assert_eq!(ten.quantity, 4);
        assert_eq!(ten.unit_price, Price::from_cents(500));

        let twenty = user.line(ProductId::new(20)).unwrap();
        assert_eq!(twenty.quantity, 1);
        assert_eq!(twenty.unit_price, Price::from_cents(900));
    }

    #[test]
    fn test_add_past_line_maximum_is_rejected() {
        let mut cart = cart();
        cart.add_or_increment(ProductId::new(1), MAX_LINE_QUANTITY, Price::from_cents(100))
            .unwrap();

        let err = cart
            .add_or_increment(ProductId::new(1), 5, Price::from_cents(100))
            .unwrap_err();
        assert_eq!(err, QuantityOverflow(i64::from(MAX_LINE_QUANTITY) + 5));
        assert_eq!(cart.line(ProductId::new(1)).unwrap().quantity, MAX_LINE_QUANTITY);

        assert!(
            cart.add_or_increment(ProductId::new(2), u32::MAX, Price::from_cents(100))
                .is_err()
        );
        assert_eq!(cart.lines.len(), 1);
    }

    #[test]
    fn test_absorb_overflow_leaves_cart_unchanged() {
        let mut user = cart();
        user.add_or_increment(ProductId::new(10), MAX_LINE_QUANTITY, Price::from_cents(500))
            .unwrap();

        let mut session = cart();
        session.add_or_increment(ProductId::new(20), 1, Price::from_cents(900)).unwrap();
        session.add_or_increment(ProductId::new(10), 1, Price::from_cents(500)).unwrap();

        let before = user.clone();
        assert!(user.absorb(&session).is_err());
        assert_eq!(user, before);
    }

    #[test]
    fn test_mutation_advances_modified_at() {
        let mut cart = cart();
        let before = cart.modified_at;
        cart.clear();
        assert!(cart.modified_at >= before);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let mut cart = cart();
        cart.add_or_increment(ProductId::new(3), 2, Price::from_cents(125)).unwrap();

        let json = serde_json::to_value(cart.summary()).unwrap();
        assert_eq!(json["itemCount"], 2);
        assert_eq!(json["total"], "2.50");
        assert_eq!(json["items"][0]["productId"], 3);
        assert_eq!(json["items"][0]["unitPrice"], "1.25");
        assert_eq!(json["items"][0]["subtotal"], "2.50");
        assert!(json["items"][0].get("productSnapshot").is_none());
    }

    #[test]
    fn test_empty_summary() {
        let summary = CartSummary::empty();
        assert_eq!(summary.item_count, 0);
        assert_eq!(summary.total, Price::ZERO);
        assert!(summary.items.is_empty());
    }
}
