//! Vouchers applied to the cart.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::backend::{DiscountKind, Voucher};

/// A voucher the visitor applied to their cart.
///
/// Holds just enough of the backend voucher to recompute the discount
/// locally whenever the cart changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedVoucher {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    #[serde(default)]
    pub min_purchase: Option<Decimal>,
    #[serde(default)]
    pub max_discount: Option<Decimal>,
}

impl AppliedVoucher {
    /// Discount this voucher grants on `subtotal`.
    ///
    /// Zero below the minimum purchase. Percentage discounts are capped at
    /// `max_discount`. The result never exceeds the subtotal.
    #[must_use]
    pub fn discount_for(&self, subtotal: Decimal) -> Decimal {
        if subtotal <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        if self.min_purchase.is_some_and(|min| subtotal < min) {
            return Decimal::ZERO;
        }

        let raw = match self.kind {
            DiscountKind::Percentage => {
                let pct = subtotal * self.value / Decimal::ONE_HUNDRED;
                self.max_discount.map_or(pct, |cap| pct.min(cap))
            }
            DiscountKind::Fixed => self.value,
        };

        raw.max(Decimal::ZERO).min(subtotal)
    }
}

impl From<&Voucher> for AppliedVoucher {
    fn from(voucher: &Voucher) -> Self {
        Self {
            code: voucher.code.to_uppercase(),
            kind: voucher.discount_type,
            value: voucher.discount_value,
            min_purchase: voucher.min_purchase,
            max_discount: voucher.max_discount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idr(amount: i64) -> Decimal {
        Decimal::new(amount, 0)
    }

    fn percentage(value: i64, max: Option<i64>) -> AppliedVoucher {
        AppliedVoucher {
            code: "SEGAR10".to_string(),
            kind: DiscountKind::Percentage,
            value: idr(value),
            min_purchase: None,
            max_discount: max.map(idr),
        }
    }

    #[test]
    fn test_percentage_discount() {
        assert_eq!(percentage(10, None).discount_for(idr(50_000)), idr(5_000));
    }

    #[test]
    fn test_percentage_discount_is_capped() {
        let voucher = percentage(50, Some(10_000));
        assert_eq!(voucher.discount_for(idr(100_000)), idr(10_000));
        assert_eq!(voucher.discount_for(idr(12_000)), idr(6_000));
    }

    #[test]
    fn test_fixed_discount_never_exceeds_subtotal() {
        let voucher = AppliedVoucher {
            code: "HEMAT15".to_string(),
            kind: DiscountKind::Fixed,
            value: idr(15_000),
            min_purchase: None,
            max_discount: None,
        };
        assert_eq!(voucher.discount_for(idr(40_000)), idr(15_000));
        assert_eq!(voucher.discount_for(idr(9_000)), idr(9_000));
        assert_eq!(voucher.discount_for(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_minimum_purchase() {
        let mut voucher = percentage(20, None);
        voucher.min_purchase = Some(idr(30_000));
        assert_eq!(voucher.discount_for(idr(29_999)), Decimal::ZERO);
        assert_eq!(voucher.discount_for(idr(30_000)), idr(6_000));
    }
}
