//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod mobile;
pub mod money;
pub mod status;

pub use id::*;
pub use mobile::{MobileNumber, MobileNumberError};
pub use money::{MAX_AMOUNT, OrderTotals, amount_in_range, line_total};
pub use status::*;
