//! Human-readable identifiers for purchase orders and products.
//!
//! - Purchase orders: `PO-<year>-<NNNN>`, e.g. `PO-2025-0001`
//! - Products: `SKU-<dd-mm-yy>-<NNNNN>`, e.g. `SKU-03-02-25-00017`
//!
//! Sequence numbers are allocated atomically by the database (one counter per
//! scope and period); this module only knows how to name the counter and how
//! to render and parse the result. Sequences wider than the padding are
//! rendered in full rather than truncated.

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Errors from parsing an identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("expected an identifier like {expected}, got {got:?}")]
    Malformed {
        /// Example of the expected format.
        expected: &'static str,
        /// The rejected input.
        got: String,
    },
}

/// Which counter an identifier is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierScope {
    /// Purchase order numbers, one counter per calendar year.
    PurchaseOrder,
    /// Product SKUs, one counter per calendar day.
    Sku,
}

impl IdentifierScope {
    /// Counter scope key stored in the database.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::PurchaseOrder => "purchase_order",
            Self::Sku => "sku",
        }
    }

    /// Counter period key for a date (the counter resets each period).
    #[must_use]
    pub fn period(&self, date: NaiveDate) -> String {
        match self {
            Self::PurchaseOrder => date.year().to_string(),
            Self::Sku => date.format("%d-%m-%y").to_string(),
        }
    }

    /// Render the identifier for a date and allocated sequence value.
    #[must_use]
    pub fn render(&self, date: NaiveDate, sequence: i64) -> String {
        match self {
            Self::PurchaseOrder => purchase_order_number(date.year(), sequence),
            Self::Sku => sku(date, sequence),
        }
    }
}

/// Format a purchase order number.
///
/// ```
/// assert_eq!(stockroom_core::identifiers::purchase_order_number(2025, 1), "PO-2025-0001");
/// ```
#[must_use]
pub fn purchase_order_number(year: i32, sequence: i64) -> String {
    format!("PO-{year}-{sequence:04}")
}

/// Format a product SKU.
#[must_use]
pub fn sku(date: NaiveDate, sequence: i64) -> String {
    format!("SKU-{}-{sequence:05}", date.format("%d-%m-%y"))
}

/// A parsed purchase order number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseOrderNumber {
    pub year: i32,
    pub sequence: i64,
}

impl PurchaseOrderNumber {
    /// Parse `PO-<year>-<sequence>`.
    ///
    /// # Errors
    ///
    /// Returns `IdentifierError::Malformed` if the prefix, year or sequence
    /// is missing or not numeric.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let malformed = || IdentifierError::Malformed {
            expected: "PO-2025-0001",
            got: s.to_owned(),
        };

        let rest = s.strip_prefix("PO-").ok_or_else(malformed)?;
        let (year, sequence) = rest.split_once('-').ok_or_else(malformed)?;

        if year.len() != 4 || sequence.len() < 4 {
            return Err(malformed());
        }
        if !year.bytes().all(|b| b.is_ascii_digit()) || !sequence.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(malformed());
        }

        let year = year.parse().map_err(|_| malformed())?;
        let sequence = sequence.parse().map_err(|_| malformed())?;
        if sequence == 0 {
            return Err(malformed());
        }

        Ok(Self { year, sequence })
    }
}

impl std::fmt::Display for PurchaseOrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&purchase_order_number(self.year, self.sequence))
    }
}
