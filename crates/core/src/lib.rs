//! Domain types and rules shared by every itemgrid crate.
//!
//! This crate has no internal dependencies and performs no I/O, so the
//! record store, the service layer and tests can all lean on it.

pub mod error;
pub mod item_query;
pub mod serial;
pub mod types;
