//! Product catalog repository for `PostgreSQL`.

use sqlx::PgPool;

use cartwheel_core::{Price, ProductId};

use super::{RepositoryError, store::ProductCatalog};
use crate::models::CatalogProduct;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    price: Price,
    available_stock: i32,
    image_url: Option<String>,
}

impl From<ProductRow> for CatalogProduct {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            price: row.price,
            // Oversold rows read as out of stock.
            available_stock: u32::try_from(row.available_stock).unwrap_or(0),
            image_url: row.image_url,
        }
    }
}

/// `PostgreSQL`-backed [`ProductCatalog`].
#[derive(Debug, Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
}

impl PgProductCatalog {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update catalog products, returning how many rows were written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing is
    /// written in that case.
    pub async fn upsert_all(&self, products: &[CatalogProduct]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;

        for product in products {
            let stock = i32::try_from(product.available_stock).unwrap_or(i32::MAX);
            let result = sqlx::query(
                r"
                INSERT INTO storefront.product (id, name, price, available_stock, image_url)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE
                SET name = EXCLUDED.name,
                    price = EXCLUDED.price,
                    available_stock = EXCLUDED.available_stock,
                    image_url = EXCLUDED.image_url,
                    updated_at = NOW()
                ",
            )
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(stock)
            .bind(product.image_url.as_deref())
            .execute(&mut *tx)
            .await?;
            written += result.rows_affected();
        }

        tx.commit().await?;
        Ok(written)
    }
}

impl ProductCatalog for PgProductCatalog {
    async fn find_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<CatalogProduct>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, available_stock, image_url
            FROM storefront.product
            WHERE id = $1
            ",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogProduct::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_stock_reads_as_zero() {
        let product = CatalogProduct::from(ProductRow {
            id: ProductId::new(1),
            name: "Tee".to_string(),
            price: Price::from_cents(2000),
            available_stock: -2,
            image_url: None,
        });
        assert_eq!(product.available_stock, 0);
    }
}
