//! Drink sizes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error returned when a size name is not recognised.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown drink size: {0}")]
pub struct DrinkSizeError(pub String);

/// Cup size of a juice order line.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum DrinkSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl DrinkSize {
    /// All sizes, smallest first.
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// Price difference from the base (medium) price, in Rupiah.
    ///
    /// Used only when the backend does not publish an explicit price for
    /// the size.
    #[must_use]
    pub fn price_adjustment(self) -> Decimal {
        match self {
            Self::Small => Decimal::new(-3_000, 0),
            Self::Medium => Decimal::ZERO,
            Self::Large => Decimal::new(5_000, 0),
        }
    }

    /// Wire name used by the backend.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for DrinkSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DrinkSize {
    type Err = DrinkSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "small" | "s" | "kecil" => Ok(Self::Small),
            "medium" | "m" | "regular" | "sedang" | "normal" => Ok(Self::Medium),
            "large" | "l" | "besar" | "jumbo" => Ok(Self::Large),
            other => Err(DrinkSizeError(other.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_indonesian_names() {
        assert_eq!("kecil".parse::<DrinkSize>().unwrap(), DrinkSize::Small);
        assert_eq!("Sedang".parse::<DrinkSize>().unwrap(), DrinkSize::Medium);
        assert_eq!(" BESAR ".parse::<DrinkSize>().unwrap(), DrinkSize::Large);
        assert!("venti".parse::<DrinkSize>().is_err());
    }

    #[test]
    fn test_default_is_medium_with_no_adjustment() {
        assert_eq!(DrinkSize::default(), DrinkSize::Medium);
        assert_eq!(DrinkSize::Medium.price_adjustment(), Decimal::ZERO);
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&DrinkSize::Large).unwrap(),
            "\"large\""
        );
    }
}
