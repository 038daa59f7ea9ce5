//! Cart repository for `PostgreSQL`.
//!
//! Ownership is stored as two nullable columns guarded by a CHECK constraint;
//! rows are converted into [`Owner`] on the way out and rejected as corrupt
//! if both or neither column is set. Partial unique indexes on the owner
//! columns (`WHERE status = 'active'`) back the one-active-cart rule.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use cartwheel_core::{CartId, CartStatus, Owner, Price, ProductId, SessionKey, UserId};

use super::{RepositoryError, map_unique_violation, store::CartStore};
use crate::models::{Cart, CartLine};

const SELECT_CART: &str = r"
    SELECT id, user_id, session_key, status, created_at, modified_at
    FROM storefront.cart
";

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: Option<UserId>,
    session_key: Option<String>,
    status: CartStatus,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    product_id: ProductId,
    quantity: i32,
    unit_price: Price,
}

impl CartRow {
    fn owner(&self) -> Result<Owner, RepositoryError> {
        match (self.user_id, self.session_key.as_deref()) {
            (Some(user_id), None) => Ok(Owner::User(user_id)),
            (None, Some(key)) => SessionKey::parse(key).map(Owner::Session).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid session key on cart {}: {e}", self.id))
            }),
            _ => Err(RepositoryError::DataCorruption(format!(
                "cart {} must have exactly one owner",
                self.id
            ))),
        }
    }

    fn into_cart(self, lines: Vec<LineRow>) -> Result<Cart, RepositoryError> {
        let owner = self.owner()?;
        let lines = lines
            .into_iter()
            .map(|r| {
                let quantity = u32::try_from(r.quantity)
                    .ok()
                    .filter(|q| *q >= 1)
                    .ok_or_else(|| {
                        RepositoryError::DataCorruption(format!(
                            "cart {} has invalid quantity {} for product {}",
                            self.id, r.quantity, r.product_id
                        ))
                    })?;
                Ok(CartLine {
                    product_id: r.product_id,
                    quantity,
                    unit_price: r.unit_price,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Cart {
            id: self.id,
            owner,
            status: self.status,
            lines,
            created_at: self.created_at,
            modified_at: self.modified_at,
        })
    }
}

/// `PostgreSQL`-backed [`CartStore`].
#[derive(Debug, Clone)]
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, row: Option<CartRow>) -> Result<Option<Cart>, RepositoryError> {
        let Some(row) = row else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, LineRow>(
            r"
            SELECT product_id, quantity, unit_price
            FROM storefront.cart_line
            WHERE cart_id = $1
            ORDER BY added_at ASC, product_id ASC
            ",
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await?;

        row.into_cart(lines).map(Some)
    }
}

/// Upsert a cart row and reconcile its lines inside an open transaction.
async fn write_cart(conn: &mut PgConnection, cart: &Cart) -> Result<(), RepositoryError> {
    let quantities = line_quantities(cart)?;
    let session_key = cart.owner.session_key().map(SessionKey::as_str);

    sqlx::query(
        r"
        INSERT INTO storefront.cart (id, user_id, session_key, status, created_at, modified_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (id) DO UPDATE
        SET user_id = EXCLUDED.user_id,
            session_key = EXCLUDED.session_key,
            status = EXCLUDED.status,
            modified_at = EXCLUDED.modified_at
        ",
    )
    .bind(cart.id)
    .bind(cart.owner.user_id())
    .bind(session_key)
    .bind(cart.status)
    .bind(cart.created_at)
    .bind(cart.modified_at)
    .execute(&mut *conn)
    .await
    .map_err(|e| map_unique_violation(e, "owner already has an active cart"))?;

    let product_ids: Vec<i32> = cart.lines.iter().map(|l| l.product_id.as_i32()).collect();
    let unit_prices: Vec<rust_decimal::Decimal> =
        cart.lines.iter().map(|l| l.unit_price.amount()).collect();

    sqlx::query(
        r"
        DELETE FROM storefront.cart_line
        WHERE cart_id = $1 AND NOT (product_id = ANY($2))
        ",
    )
    .bind(cart.id)
    .bind(&product_ids)
    .execute(&mut *conn)
    .await?;

    sqlx::query(
        r"
        INSERT INTO storefront.cart_line (cart_id, product_id, quantity, unit_price)
        SELECT $1, l.product_id, l.quantity, l.unit_price
        FROM UNNEST($2::int4[], $3::int4[], $4::numeric[]) AS l(product_id, quantity, unit_price)
        ON CONFLICT (cart_id, product_id) DO UPDATE
        SET quantity = EXCLUDED.quantity,
            unit_price = EXCLUDED.unit_price
        ",
    )
    .bind(cart.id)
    .bind(&product_ids)
    .bind(&quantities)
    .bind(&unit_prices)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

impl CartStore for PgCartStore {
    async fn find_active_by_user(&self, user_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "{SELECT_CART} WHERE user_id = $1 AND status = 'active'"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        self.load(row).await
    }

    async fn find_active_by_session(
        &self,
        session_key: &SessionKey,
    ) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(&format!(
            "{SELECT_CART} WHERE session_key = $1 AND status = 'active'"
        ))
        .bind(session_key.as_str())
        .fetch_optional(&self.pool)
        .await?;

        self.load(row).await
    }

    async fn create_for_user(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.cart (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) WHERE status = 'active' DO NOTHING
            ",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        // Either our row or the one a concurrent request inserted first.
        self.find_active_by_user(user_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn create_for_session(&self, session_key: &SessionKey) -> Result<Cart, RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.cart (session_key)
            VALUES ($1)
            ON CONFLICT (session_key) WHERE status = 'active' DO NOTHING
            ",
        )
        .bind(session_key.as_str())
        .execute(&self.pool)
        .await?;

        self.find_active_by_session(session_key)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        write_cart(&mut tx, cart).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, cart: &Cart) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.cart WHERE id = $1")
            .bind(cart.id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_merged(&self, target: &Cart, absorbed: &Cart) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM storefront.cart WHERE id = $1")
            .bind(absorbed.id)
            .execute(&mut *tx)
            .await?;

        write_cart(&mut tx, target).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn mark_abandoned_before(&self, cutoff: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE storefront.cart
            SET status = 'abandoned'
            WHERE status = 'active' AND modified_at < $1
            ",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Line quantities as stored, rejecting any that do not fit the column.
fn line_quantities(cart: &Cart) -> Result<Vec<i32>, RepositoryError> {
    cart.lines
        .iter()
        .map(|l| {
            i32::try_from(l.quantity).map_err(|_| {
                RepositoryError::DataCorruption(format!(
                    "cart {} line {} quantity {} exceeds the stored range",
                    cart.id, l.product_id, l.quantity
                ))
            })
        })
        .collect()
}
