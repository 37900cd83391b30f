//! HTTP middleware for admin.
//!
//! # Layer order (outermost first, see `lib.rs`)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request spans with status and latency)
//!
//! Authentication is per handler through the extractors in [`auth`].

pub mod auth;

pub use auth::{RequireAdminAuth, RequireWriteAccess};
