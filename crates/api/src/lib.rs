//! Itemgrid API server library.
//!
//! Exposes the core building blocks (config, state, item service, error
//! handling, routes, WebSocket infrastructure) so integration tests and the
//! binary entrypoint can both access them.

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod notifications;
pub mod router;
pub mod routes;
pub mod service;
pub mod state;
pub mod ws;
