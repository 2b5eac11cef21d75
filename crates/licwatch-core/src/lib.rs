//! Core infrastructure for licwatch
//!
//! This crate provides:
//! - The once-per-day scheduler gate that triggers the notification pipeline
//! - Device-local preferences stored encrypted on disk

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod local_prefs;
pub mod scheduler;

pub use local_prefs::{EncryptedFilePrefs, LocalPrefsStore};
pub use scheduler::{DailyGate, DailyJob, DailyScheduler, TickOutcome};

mod prelude;

// vim: ts=4
