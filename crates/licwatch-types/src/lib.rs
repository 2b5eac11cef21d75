//! Shared types, adapter traits, and core utilities for licwatch.
//!
//! This crate holds the record types read from the relational store, the
//! `StoreAdapter` trait the adapters implement, the error type and the clock
//! abstraction. Feature crates and adapters depend on it so they can compile
//! independently of each other.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod clock;
pub mod error;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
