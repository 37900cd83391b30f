//! Stockroom Core - Shared domain types.
//!
//! This crate provides the types and pure business rules used across the
//! Stockroom components:
//! - `admin` - JSON API for the retail/inventory admin panel
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Everything that decides *what* to write lives here so it
//! can be tested without a database; the admin crate decides *how* it is
//! written.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, statuses, money and phone numbers
//! - [`identifiers`] - Purchase-order number and SKU formats
//! - [`reconciliation`] - Receiving plans: status derivation and unit serials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod identifiers;
pub mod reconciliation;
pub mod types;

pub use types::*;
