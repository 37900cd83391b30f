//! Receiving reconciliation plans.
//!
//! When a delivery arrives, each purchase-order line reports how many units
//! were ordered, received (accepted) and rejected. This module turns those
//! counts into everything the database write needs:
//!
//! - the line status (`Partial` whenever anything was rejected),
//! - the accepted total, a monetary amount (`received * unit_price`),
//! - one planned instance per physical unit, serial numbers starting at 1,
//!   accepted units first and rejected units continuing the sequence.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use stockroom_core::reconciliation::{LineCounts, plan_line};
//! use stockroom_core::{InstanceStatus, LineItemStatus};
//!
//! let plan = plan_line(LineCounts { ordered: 5, received: 3, rejected: 2 }, Decimal::new(5000, 2)).unwrap();
//! assert_eq!(plan.status, LineItemStatus::Partial);
//! assert_eq!(plan.instances.len(), 5);
//! assert_eq!(plan.instances[3].serial_no, 4);
//! assert_eq!(plan.instances[3].status, InstanceStatus::Rejected);
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use crate::types::{InstanceStatus, LineItemStatus, amount_in_range};

/// Most units a single line may order, receive or reject.
///
/// Every unit becomes a planned instance in memory, so this bounds the plan.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

/// Errors that make a line receipt impossible to reconcile.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    #[error("{field} cannot be negative (got {value})")]
    NegativeQuantity { field: &'static str, value: i32 },

    #[error("received ({received}) plus rejected ({rejected}) exceeds ordered quantity ({ordered})")]
    ExceedsOrdered {
        ordered: i32,
        received: i32,
        rejected: i32,
    },

    #[error("{field} cannot exceed {max} (got {value})")]
    QuantityTooLarge {
        field: &'static str,
        value: i32,
        max: i32,
    },

    #[error("unit price cannot be negative")]
    NegativePrice,

    #[error("unit price or accepted total is out of range")]
    AmountOutOfRange,
}

/// Quantities reported for one line of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCounts {
    pub ordered: i32,
    pub received: i32,
    pub rejected: i32,
}

/// A unit to materialize as a product instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedInstance {
    /// 1-based, contiguous within the line.
    pub serial_no: i32,
    pub status: InstanceStatus,
}

/// Everything the receiving write needs for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePlan {
    pub status: LineItemStatus,
    pub accepted_quantity: i32,
    pub rejected_quantity: i32,
    pub accepted_total: Decimal,
    pub instances: Vec<PlannedInstance>,
}

impl LinePlan {
    /// Number of planned instances with the given status.
    #[must_use]
    pub fn count(&self, status: InstanceStatus) -> usize {
        self.instances.iter().filter(|i| i.status == status).count()
    }

    /// Serial numbers and statuses as parallel columns, ready for a bulk insert.
    #[must_use]
    pub fn instance_columns(&self) -> (Vec<i32>, Vec<InstanceStatus>) {
        self.instances
            .iter()
            .map(|i| (i.serial_no, i.status))
            .unzip()
    }
}

/// Derive a line status from its received and rejected counts.
///
/// Any rejection marks the line `Partial`, even when nothing was accepted.
#[must_use]
pub const fn derive_line_status(_received: i32, rejected: i32) -> LineItemStatus {
    if rejected > 0 {
        LineItemStatus::Partial
    } else {
        LineItemStatus::Accepted
    }
}

/// Build the reconciliation plan for one line.
///
/// # Errors
///
/// Returns `ReconciliationError` if any quantity is negative, the unit price
/// is negative, or received plus rejected exceeds the ordered quantity.
pub fn plan_line(counts: LineCounts, unit_price: Decimal) -> Result<LinePlan, ReconciliationError> {
    let LineCounts {
        ordered,
        received,
        rejected,
    } = counts;

    for (field, value) in [
        ("ordered quantity", ordered),
        ("received quantity", received),
        ("rejected quantity", rejected),
    ] {
        if value < 0 {
            return Err(ReconciliationError::NegativeQuantity { field, value });
        }
        if value > MAX_LINE_QUANTITY {
            return Err(ReconciliationError::QuantityTooLarge {
                field,
                value,
                max: MAX_LINE_QUANTITY,
            });
        }
    }
    if unit_price.is_sign_negative() && !unit_price.is_zero() {
        return Err(ReconciliationError::NegativePrice);
    }
    let accepted_total = unit_price
        .checked_mul(Decimal::from(received))
        .filter(|total| amount_in_range(unit_price) && amount_in_range(*total))
        .ok_or(ReconciliationError::AmountOutOfRange)?;

    let handled = i64::from(received) + i64::from(rejected);
    if handled > i64::from(ordered) {
        return Err(ReconciliationError::ExceedsOrdered {
            ordered,
            received,
            rejected,
        });
    }

    // received + rejected <= ordered <= MAX_LINE_QUANTITY, so the serials fit.
    let accepted = (1..=received).map(|serial_no| PlannedInstance {
        serial_no,
        status: InstanceStatus::Accepted,
    });
    let refused = (1..=rejected).map(|offset| PlannedInstance {
        serial_no: received + offset,
        status: InstanceStatus::Rejected,
    });

    Ok(LinePlan {
        status: derive_line_status(received, rejected),
        accepted_quantity: received,
        rejected_quantity: rejected,
        accepted_total,
        instances: accepted.chain(refused).collect(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn counts(ordered: i32, received: i32, rejected: i32) -> LineCounts {
        LineCounts {
            ordered,
            received,
            rejected,
        }
    }

    fn price(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_status_derivation() {
        assert_eq!(derive_line_status(10, 0), LineItemStatus::Accepted);
        assert_eq!(derive_line_status(3, 2), LineItemStatus::Partial);
        // Fully rejected lines still come out as Partial.
        assert_eq!(derive_line_status(0, 4), LineItemStatus::Partial);
    }

    #[test]
    fn test_five_received_two_rejected() {
        let plan = plan_line(counts(7, 5, 2), price("12.50")).unwrap();

        assert_eq!(plan.instances.len(), 7);
        let serials: Vec<i32> = plan.instances.iter().map(|i| i.serial_no).collect();
        assert_eq!(serials, (1..=7).collect::<Vec<_>>());
        assert!(plan.instances[..5]
            .iter()
            .all(|i| i.status == InstanceStatus::Accepted));
        assert!(plan.instances[5..]
            .iter()
            .all(|i| i.status == InstanceStatus::Rejected));
        assert_eq!(plan.accepted_total, price("62.50"));
    }

    #[test]
    fn test_fully_accepted_line() {
        let plan = plan_line(counts(10, 10, 0), price("100.00")).unwrap();
        assert_eq!(plan.status, LineItemStatus::Accepted);
        assert_eq!(plan.count(InstanceStatus::Accepted), 10);
        assert_eq!(plan.count(InstanceStatus::Rejected), 0);
        assert_eq!(plan.accepted_total, price("1000.00"));
    }

    #[test]
    fn test_short_delivery_is_allowed() {
        let plan = plan_line(counts(10, 4, 1), price("1")).unwrap();
        assert_eq!(plan.instances.len(), 5);
        assert_eq!(plan.status, LineItemStatus::Partial);
    }

    #[test]
    fn test_nothing_received() {
        let plan = plan_line(counts(3, 0, 0), price("1")).unwrap();
        assert!(plan.instances.is_empty());
        assert_eq!(plan.status, LineItemStatus::Accepted);
        assert_eq!(plan.accepted_total, Decimal::ZERO);
    }

    #[test]
    fn test_over_delivery_rejected() {
        assert_eq!(
            plan_line(counts(5, 4, 2), price("1")),
            Err(ReconciliationError::ExceedsOrdered {
                ordered: 5,
                received: 4,
                rejected: 2
            })
        );
    }

    #[test]
    fn test_negative_inputs_rejected() {
        assert!(matches!(
            plan_line(counts(5, -1, 0), price("1")),
            Err(ReconciliationError::NegativeQuantity { value: -1, .. })
        ));
        assert_eq!(
            plan_line(counts(5, 1, 0), price("-0.01")),
            Err(ReconciliationError::NegativePrice)
        );
    }

    #[test]
    fn test_quantities_are_capped_before_planning() {
        assert_eq!(
            plan_line(counts(i32::MAX, i32::MAX, 0), price("1")),
            Err(ReconciliationError::QuantityTooLarge {
                field: "ordered quantity",
                value: i32::MAX,
                max: MAX_LINE_QUANTITY
            })
        );
        assert!(matches!(
            plan_line(counts(MAX_LINE_QUANTITY, 0, MAX_LINE_QUANTITY + 1), price("1")),
            Err(ReconciliationError::QuantityTooLarge { field: "rejected quantity", .. })
        ));

        let plan = plan_line(counts(MAX_LINE_QUANTITY, MAX_LINE_QUANTITY, 0), price("1")).unwrap();
        assert_eq!(plan.instances.len(), 10_000);
    }

    #[test]
    fn test_oversized_price_rejected() {
        assert_eq!(
            plan_line(counts(2, 2, 0), Decimal::MAX),
            Err(ReconciliationError::AmountOutOfRange)
        );
        assert_eq!(
            plan_line(counts(2, 2, 0), price("999999999999.99")),
            Err(ReconciliationError::AmountOutOfRange)
        );
    }

    #[test]
    fn test_accepted_total_is_money_not_a_count() {
        let plan = plan_line(counts(5, 3, 2), price("50.00")).unwrap();
        assert_eq!(plan.accepted_quantity, 3);
        assert_eq!(plan.accepted_total, price("150.00"));
    }

    #[test]
    fn test_instance_columns() {
        let plan = plan_line(counts(3, 2, 1), price("1")).unwrap();
        let (serials, statuses) = plan.instance_columns();
        assert_eq!(serials, vec![1, 2, 3]);
        assert_eq!(
            statuses,
            vec![
                InstanceStatus::Accepted,
                InstanceStatus::Accepted,
                InstanceStatus::Rejected
            ]
        );
    }
}
