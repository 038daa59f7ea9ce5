//! Seed the catalog from a YAML file.
//!
//! The file is parsed and validated before any connection is made, so a bad
//! file never touches the database.

use std::path::Path;

use tracing::{error, info};

use cartwheel_storefront::db::PgProductCatalog;
use cartwheel_storefront::models::CatalogSeed;

/// Upsert catalog products from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or fails validation, or if a
/// database operation fails.
pub async fn products(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("File not found: {}", path.display()).into());
    }

    info!(path = %path.display(), "Loading catalog from file");

    let content = tokio::fs::read_to_string(path).await?;
    let seed = CatalogSeed::from_yaml(&content)?;

    info!(products = seed.products.len(), "Parsed catalog");

    let errors = seed.validate();
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let pool = super::connect().await?;
    let catalog = PgProductCatalog::new(pool);
    let written = catalog.upsert_all(&seed.products).await?;

    info!(written, "Catalog seeding complete!");
    Ok(())
}
