//! Type-safe price representation using decimal arithmetic.
//!
//! JuiceQu sells in Indonesian Rupiah, which has no minor unit in everyday
//! use, so prices render without fraction digits (`Rp 25.000`).

use std::fmt::Write;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a Rupiah price.
    #[must_use]
    pub const fn idr(amount: Decimal) -> Self {
        Self::new(amount, CurrencyCode::IDR)
    }

    /// A zero Rupiah price.
    #[must_use]
    pub const fn zero() -> Self {
        Self::idr(Decimal::ZERO)
    }

    /// Format for display, e.g. `Rp 25.000` or `-Rp 5.000`.
    #[must_use]
    pub fn display(&self) -> String {
        let rounded = self
            .amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let digits = rounded.abs().trunc().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(self.currency_code.thousands_separator());
            }
            grouped.push(ch);
        }

        let mut out = String::new();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        let _ = write!(out, "{} {grouped}", self.currency_code.symbol());
        out
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

/// ISO 4217 currency codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[allow(clippy::upper_case_acronyms)]
pub enum CurrencyCode {
    #[default]
    IDR,
    USD,
}

impl CurrencyCode {
    /// Display symbol placed before the amount.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::IDR => "Rp",
            Self::USD => "$",
        }
    }

    const fn thousands_separator(self) -> char {
        match self {
            Self::IDR => '.',
            Self::USD => ',',
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Price::idr(Decimal::new(25_000, 0)).display(), "Rp 25.000");
        assert_eq!(
            Price::idr(Decimal::new(1_250_000, 0)).display(),
            "Rp 1.250.000"
        );
        assert_eq!(Price::idr(Decimal::new(500, 0)).display(), "Rp 500");
    }

    #[test]
    fn test_display_zero_and_negative() {
        assert_eq!(Price::zero().display(), "Rp 0");
        assert_eq!(Price::idr(Decimal::new(-5_000, 0)).display(), "-Rp 5.000");
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        // 12_499.5 -> 12_500
        assert_eq!(Price::idr(Decimal::new(124_995, 1)).display(), "Rp 12.500");
        // 999.4 -> 999
        assert_eq!(Price::idr(Decimal::new(9_994, 1)).display(), "Rp 999");
    }

    #[test]
    fn test_display_usd_separator() {
        let price = Price::new(Decimal::new(1_500, 0), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$ 1,500");
    }
}
