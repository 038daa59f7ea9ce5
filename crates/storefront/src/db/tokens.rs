//! API token repository for `PostgreSQL`.
//!
//! Only the SHA-256 hash of a bearer token is stored; the plain token never
//! touches the database.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

use cartwheel_core::UserId;

use super::{RepositoryError, store::IdentityResolver};

/// Hex-encoded SHA-256 of a bearer token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// `PostgreSQL`-backed [`IdentityResolver`].
#[derive(Debug, Clone)]
pub struct PgIdentityResolver {
    pool: PgPool,
}

impl PgIdentityResolver {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a bearer token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token is already registered.
    pub async fn insert(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO storefront.api_token (token_hash, user_id, expires_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(hash_token(token))
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| super::map_unique_violation(e, "token already exists"))?;

        Ok(())
    }
}

impl IdentityResolver for PgIdentityResolver {
    async fn resolve_bearer(&self, token: &str) -> Result<Option<UserId>, RepositoryError> {
        let user_id = sqlx::query_scalar::<_, UserId>(
            r"
            SELECT user_id
            FROM storefront.api_token
            WHERE token_hash = $1 AND expires_at > NOW()
            ",
        )
        .bind(hash_token(token))
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let hash = hash_token("secret-token");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_token("secret-token"));
        assert_ne!(hash, hash_token("other-token"));
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
