//! JuiceQu Core - Shared types library.
//!
//! This crate provides common types used across all JuiceQu components:
//! - `storefront` - Customer, cashier and admin web tier
//! - `cli` - Command-line tools for migrations and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. The REST backend owns every durable record; these types
//! describe the values the storefront mirrors from it.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, emails, sizes and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
