//! Push-channel delivery of item events.
//!
//! The [`EventBroadcaster`] subscribes to the event bus and forwards every
//! item event to all connected WebSocket clients.

pub mod broadcaster;

pub use broadcaster::EventBroadcaster;
