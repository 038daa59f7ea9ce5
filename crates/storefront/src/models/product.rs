//! Catalog product types.

use serde::Deserialize;

use cartwheel_core::{Price, ProductId};

use super::cart::ProductSnapshot;

/// What the cart engine needs to know about a catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogProduct {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub available_stock: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl CatalogProduct {
    /// Display copy of this product for cart summaries.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            name: self.name.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// Catalog seed file.
///
/// Used by `cw-cli seed products` and by the in-memory backend.
///
/// ```yaml
/// products:
///   - id: 10
///     name: Canvas Tote
///     price: "24.00"
///     available_stock: 12
///     image_url: /static/tote.png
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogSeed {
    pub products: Vec<CatalogProduct>,
}

impl CatalogSeed {
    /// Parse a seed file from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Check the seed for problems that would violate catalog invariants.
    ///
    /// Returns one message per problem; an empty list means the seed is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for product in &self.products {
            if !product.id.is_positive() {
                errors.push(format!("product id {} must be positive", product.id));
            }
            if !seen.insert(product.id) {
                errors.push(format!("duplicate product id {}", product.id));
            }
            if product.name.trim().is_empty() {
                errors.push(format!("product {} has an empty name", product.id));
            }
            if product.price < Price::ZERO {
                errors.push(format!("product {} has a negative price", product.id));
            }
        }

        errors
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const SEED: &str = r#"
products:
  - id: 10
    name: Canvas Tote
    price: "24.00"
    available_stock: 12
    image_url: /static/tote.png
  - id: 20
    name: Sticker
    price: "2.50"
    available_stock: 100
"#;

    #[test]
    fn test_parse_seed() {
        let seed = CatalogSeed::from_yaml(SEED).unwrap();
        assert_eq!(seed.products.len(), 2);
        assert_eq!(seed.products[0].price, Price::from_cents(2400));
        assert_eq!(seed.products[1].image_url, None);
        assert!(seed.validate().is_empty());
    }

    #[test]
    fn test_validate_catches_duplicates_and_bad_ids() {
        let mut seed = CatalogSeed::from_yaml(SEED).unwrap();
        seed.products[1].id = ProductId::new(10);
        seed.products.push(CatalogProduct {
            id: ProductId::new(0),
            name: " ".to_string(),
            price: Price::from_cents(-1),
            available_stock: 0,
            image_url: None,
        });

        let errors = seed.validate();
        assert!(errors.iter().any(|e| e.contains("duplicate product id 10")));
        assert!(errors.iter().any(|e| e.contains("must be positive")));
        assert!(errors.iter().any(|e| e.contains("empty name")));
        assert!(errors.iter().any(|e| e.contains("negative price")));
    }

    #[test]
    fn test_snapshot() {
        let seed = CatalogSeed::from_yaml(SEED).unwrap();
        let snapshot = seed.products[0].snapshot();
        assert_eq!(snapshot.name, "Canvas Tote");
        assert_eq!(snapshot.image_url.as_deref(), Some("/static/tote.png"));
    }
}
