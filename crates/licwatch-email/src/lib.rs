//! Expiry notice email support
//!
//! This crate provides:
//! - Template note parsing (structured JSON, legacy text or empty)
//! - Notice rendering with variable substitution (Handlebars)
//! - A narrow, pattern based sanitizer for operator supplied HTML
//! - The `MailTransport` seam and its SMTP implementation (lettre)

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod sanitize;
pub mod sender;
pub mod template;

pub use sanitize::sanitize_html;
pub use sender::{MailTransport, OutgoingEmail, SmtpMailer, SmtpSettings, TlsMode};
pub use template::{NoticeRow, RenderedEmail, TemplateNotes, TemplateRenderer};

mod prelude;

// vim: ts=4
