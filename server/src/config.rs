//! Server configuration read from environment variables

use std::path::PathBuf;
use std::time::Duration;

use licwatch_email::{SmtpSettings, TlsMode};

use crate::prelude::*;

const DEFAULT_DB_PATH: &str = "./data/licwatch.db";
const DEFAULT_LISTEN: &str = "127.0.0.1:8080";
const DEFAULT_PROVIDER: &str = "smtp";
const DEFAULT_LOCAL_PREFS_PATH: &str = "./data/local-prefs.enc";
const DEFAULT_LOCAL_PREFS_SECRET: &str = "licwatch-local";

#[derive(Debug, Clone)]
pub struct ServerConfig {
	pub db_path: PathBuf,
	pub listen: Box<str>,
	pub smtp: SmtpSettings,
	pub provider: Box<str>,
	pub local_prefs_path: PathBuf,
	pub local_prefs_secret: Box<str>,
}

impl ServerConfig {
	pub fn from_env() -> ClResult<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Build the configuration from a variable lookup. Unset and blank
	/// variables fall back to their defaults.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClResult<Self> {
		let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

		let mut smtp = SmtpSettings::default();
		if let Some(host) = var("SMTP_HOST") {
			smtp.host = host;
		}
		if let Some(port) = var("SMTP_PORT") {
			smtp.port = port
				.parse()
				.map_err(|_| Error::ConfigError(format!("invalid SMTP_PORT: {}", port)))?;
		}
		if let Some(mode) = var("SMTP_TLS_MODE") {
			smtp.tls_mode = mode.parse::<TlsMode>()?;
		}
		if let Some(timeout) = var("SMTP_TIMEOUT_SECONDS") {
			let secs: u64 = timeout
				.parse()
				.map_err(|_| Error::ConfigError(format!("invalid SMTP_TIMEOUT_SECONDS: {}", timeout)))?;
			smtp.timeout = Duration::from_secs(secs);
		}

		let local_prefs_secret = var("LOCAL_PREFS_SECRET").unwrap_or_else(|| {
			warn!("LOCAL_PREFS_SECRET is not set, using the built-in default");
			DEFAULT_LOCAL_PREFS_SECRET.into()
		});

		Ok(Self {
			db_path: var("DB_PATH").map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from),
			listen: var("LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.into()).into(),
			smtp,
			provider: var("SENDER_PROVIDER").unwrap_or_else(|| DEFAULT_PROVIDER.into()).into(),
			local_prefs_path: var("LOCAL_PREFS_PATH")
				.map_or_else(|| PathBuf::from(DEFAULT_LOCAL_PREFS_PATH), PathBuf::from),
			local_prefs_secret: local_prefs_secret.into(),
		})
	}
}


// vim: ts=4
