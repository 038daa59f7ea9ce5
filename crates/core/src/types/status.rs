//! Status and policy enums for carts.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a cart.
///
/// Only `Active` carts are visible to lookups; `Abandoned` and `Converted`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "storefront.cart_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Cart is in use and can be mutated.
    #[default]
    Active,
    /// Cart was left untouched long enough for the housekeeping sweep.
    Abandoned,
    /// An order was placed from this cart.
    Converted,
}

impl CartStatus {
    /// Returns `true` for statuses that can never change again.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Abandoned | Self::Converted)
    }
}

impl std::fmt::Display for CartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Abandoned => write!(f, "abandoned"),
            Self::Converted => write!(f, "converted"),
        }
    }
}

/// How requested quantities are compared against available stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Only the requested increment is compared with stock. Repeated adds can
    /// push a line past the available stock.
    #[default]
    Increment,
    /// The resulting line quantity is compared with stock.
    Cumulative,
}

impl std::fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increment => write!(f, "increment"),
            Self::Cumulative => write!(f, "cumulative"),
        }
    }
}

impl std::str::FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "increment" => Ok(Self::Increment),
            "cumulative" => Ok(Self::Cumulative),
            _ => Err(format!("invalid stock policy: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!CartStatus::Active.is_terminal());
        assert!(CartStatus::Abandoned.is_terminal());
        assert!(CartStatus::Converted.is_terminal());
    }

    #[test]
    fn test_stock_policy_from_str() {
        assert_eq!(
            "increment".parse::<StockPolicy>().unwrap(),
            StockPolicy::Increment
        );
        assert_eq!(
            "cumulative".parse::<StockPolicy>().unwrap(),
            StockPolicy::Cumulative
        );
        assert!("strict".parse::<StockPolicy>().is_err());
    }

    #[test]
    fn test_stock_policy_display_roundtrip() {
        for policy in [StockPolicy::Increment, StockPolicy::Cumulative] {
            assert_eq!(policy.to_string().parse::<StockPolicy>().unwrap(), policy);
        }
    }
}
