//! Marigold Core - Shared types library.
//!
//! This crate provides common types used across all Marigold components:
//! - `storefront` - Public-facing e-commerce site
//! - `admin` - Internal back-office panel
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. The backing
//! document store and payment provider live behind the backend REST API; this
//! crate only models what crosses that boundary.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, money, order statuses, and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
