//! Housekeeping sweep for idle carts.

use chrono::{Duration, Utc};

use cartwheel_storefront::db::{CartStore, PgCartStore};

const DEFAULT_ABANDON_AFTER_DAYS: u32 = 30;

/// Mark active carts untouched for `older_than_days` as abandoned.
///
/// Falls back to `CART_ABANDON_AFTER_DAYS`, then 30, when no value is given.
///
/// # Errors
///
/// Returns an error if the environment is invalid or the update fails.
pub async fn run(older_than_days: Option<u32>) -> Result<(), Box<dyn std::error::Error>> {
    let days = match older_than_days {
        Some(days) => days,
        None => abandon_after_days_from_env()?,
    };
    if days == 0 {
        return Err("older-than-days must be at least 1".into());
    }

    let cutoff = Utc::now() - Duration::days(i64::from(days));
    let store = PgCartStore::new(super::connect().await?);

    let swept = store.mark_abandoned_before(cutoff).await?;
    tracing::info!(swept, days, %cutoff, "Abandoned idle carts");
    Ok(())
}

fn abandon_after_days_from_env() -> Result<u32, String> {
    dotenvy::dotenv().ok();
    match std::env::var("CART_ABANDON_AFTER_DAYS") {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid environment variable CART_ABANDON_AFTER_DAYS: {e}")),
        Err(_) => Ok(DEFAULT_ABANDON_AFTER_DAYS),
    }
}
