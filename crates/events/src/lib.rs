//! Itemgrid change notifications.
//!
//! - [`EventBus`] - in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ItemEvent`] - the events broadcast when items are added or deleted.

pub mod bus;

pub use bus::{EventBus, ItemEvent};
