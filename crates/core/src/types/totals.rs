//! Monetary breakdown of an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The monetary breakdown submitted with (and stored on) an order.
///
/// Invariant: `total == subtotal + tax + shipping`. Amounts are exact
/// decimals, so the check is exact equality, not a float tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Whether the breakdown adds up.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.total == self.subtotal + self.tax + self.shipping
    }

    /// Whether every component is non-negative.
    #[must_use]
    pub fn is_non_negative(&self) -> bool {
        !self.subtotal.is_sign_negative()
            && !self.tax.is_sign_negative()
            && !self.shipping.is_sign_negative()
            && !self.total.is_sign_negative()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Cents-denominated decimal, scale 2.
    fn cents(n: i64) -> Decimal {
        Decimal::new(n, 2)
    }

    #[test]
    fn test_consistent_breakdown() {
        let totals = OrderTotals {
            subtotal: cents(10_000),
            tax: cents(825),
            shipping: cents(500),
            total: cents(11_325),
        };
        assert!(totals.is_consistent());
        assert!(totals.is_non_negative());
    }

    #[test]
    fn test_inconsistent_breakdown() {
        let totals = OrderTotals {
            subtotal: cents(10_000),
            tax: cents(825),
            shipping: cents(500),
            total: cents(11_326),
        };
        assert!(!totals.is_consistent());
    }

    #[test]
    fn test_exactness_where_floats_would_drift() {
        // 0.1 + 0.2 == 0.3 holds for decimals
        let totals = OrderTotals {
            subtotal: cents(10),
            tax: cents(20),
            shipping: cents(0),
            total: cents(30),
        };
        assert!(totals.is_consistent());
    }

    #[test]
    fn test_negative_component() {
        let totals = OrderTotals {
            subtotal: cents(-100),
            tax: cents(0),
            shipping: cents(0),
            total: cents(-100),
        };
        assert!(totals.is_consistent());
        assert!(!totals.is_non_negative());
    }
}
