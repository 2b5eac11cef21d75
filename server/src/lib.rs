//! licwatch server
//!
//! Wires the store, local preferences, mail transport and clock into the
//! notification module, starts the daily scheduler and serves the
//! `/api/notify` HTTP surface.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod routes;

mod prelude;

pub use app::AppBuilder;
pub use config::ServerConfig;

// vim: ts=4
