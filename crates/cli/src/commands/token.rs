//! API token issuance.

use chrono::{Duration, Utc};
use uuid::Uuid;

use cartwheel_core::UserId;
use cartwheel_storefront::db::PgIdentityResolver;

/// Issue a bearer token for a user and print it once.
///
/// Only the token's hash is stored, so it cannot be shown again.
///
/// # Errors
///
/// Returns an error if the user id is invalid or the insert fails.
pub async fn create(user_id: UserId, days: u32) -> Result<(), Box<dyn std::error::Error>> {
    if !user_id.is_positive() {
        return Err(format!("Invalid user id: {user_id}").into());
    }
    if days == 0 {
        return Err("days must be at least 1".into());
    }

    let token = Uuid::new_v4().simple().to_string();
    let expires_at = Utc::now() + Duration::days(i64::from(days));

    let identity = PgIdentityResolver::new(super::connect().await?);
    identity.insert(&token, user_id, expires_at).await?;

    tracing::info!(%user_id, %expires_at, "Token created");

    #[allow(clippy::print_stdout)]
    {
        println!("{token}");
    }

    Ok(())
}
