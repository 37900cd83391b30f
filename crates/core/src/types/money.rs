//! Monetary fields of a purchase order.
//!
//! Amounts are `Decimal` end to end; the admin crate serializes them as
//! strings (`serde-with-str`) so clients never see binary floating point.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Largest magnitude a stored amount may have (`NUMERIC(14, 2)`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Whether an amount fits the storage columns.
#[must_use]
pub fn amount_in_range(value: Decimal) -> bool {
    value.abs() <= MAX_AMOUNT
}

/// Compute a line total: `unit_price * quantity - discount`.
///
/// Returns `None` if the arithmetic overflows.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32, discount: Decimal) -> Option<Decimal> {
    unit_price
        .checked_mul(Decimal::from(quantity))?
        .checked_sub(discount)
}

/// Summary block of a purchase order.
///
/// Callers compute these figures; the system stores them as given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub sub_total: Decimal,
    pub total_discount: Decimal,
    pub tax_enabled: bool,
    pub tax_percentage: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

impl OrderTotals {
    /// The total implied by the other fields: `sub_total - total_discount + tax_amount`.
    ///
    /// Returns `None` if the arithmetic overflows.
    #[must_use]
    pub fn expected_total(&self) -> Option<Decimal> {
        self.sub_total
            .checked_sub(self.total_discount)?
            .checked_add(self.tax_amount)
    }

    /// Whether `total_amount` matches [`Self::expected_total`].
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.expected_total() == Some(self.total_amount)
    }

    fn fields(&self) -> [(&'static str, Decimal); 5] {
        [
            ("sub_total", self.sub_total),
            ("total_discount", self.total_discount),
            ("tax_percentage", self.tax_percentage),
            ("tax_amount", self.tax_amount),
            ("total_amount", self.total_amount),
        ]
    }

    /// Names of fields holding negative amounts.
    #[must_use]
    pub fn negative_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| value.is_sign_negative() && !value.is_zero())
            .map(|(name, _)| name)
            .collect()
    }

    /// Names of fields too large for the storage columns.
    #[must_use]
    pub fn out_of_range_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| !amount_in_range(*value))
            .map(|(name, _)| name)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap_or_default()
    }

    fn totals(total: &str) -> OrderTotals {
        OrderTotals {
            sub_total: dec("1250.00"),
            total_discount: dec("50.00"),
            tax_enabled: true,
            tax_percentage: dec("18"),
            tax_amount: dec("216.00"),
            total_amount: dec(total),
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(dec("100.00"), 10, Decimal::ZERO), Some(dec("1000.00")));
        assert_eq!(line_total(dec("50.00"), 5, dec("25.00")), Some(dec("225.00")));
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        assert_eq!(line_total(Decimal::MAX, 2, Decimal::ZERO), None);
        assert_eq!(line_total(Decimal::MIN, 1, Decimal::MAX), None);
    }

    #[test]
    fn test_expected_total() {
        assert_eq!(totals("0").expected_total(), Some(dec("1416.00")));
        assert!(totals("1416.00").is_consistent());
        assert!(!totals("1400.00").is_consistent());
    }

    #[test]
    fn test_overflowing_totals_are_inconsistent() {
        let t = OrderTotals {
            sub_total: Decimal::MAX,
            tax_amount: Decimal::MAX,
            ..totals("0")
        };
        assert_eq!(t.expected_total(), None);
        assert!(!t.is_consistent());
        assert_eq!(t.out_of_range_fields(), vec!["sub_total", "tax_amount"]);
    }

    #[test]
    fn test_max_amount_matches_column_precision() {
        assert_eq!(MAX_AMOUNT, dec("999999999999.99"));
        assert!(amount_in_range(dec("-999999999999.99")));
        assert!(!amount_in_range(dec("1000000000000.00")));
        assert!(totals("1416.00").out_of_range_fields().is_empty());
    }

    #[test]
    fn test_negative_fields() {
        let mut t = totals("1416.00");
        assert!(t.negative_fields().is_empty());
        t.total_discount = dec("-1");
        assert_eq!(t.negative_fields(), vec!["total_discount"]);
    }
}
