//! Marigold Admin - Back-office library.
//!
//! Order management for staff: browse orders from the backend orders API
//! and move them through the fulfillment statuses with an explicit
//! select-then-confirm flow that rolls back on backend rejection.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod config;
pub mod error;
pub mod orders;
pub mod routes;
pub mod state;
