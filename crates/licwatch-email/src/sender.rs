//! SMTP email sender using lettre
//!
//! The SMTP endpoint (host, port, TLS mode, timeout) comes from the server
//! configuration. The identity comes from the sender configuration row: its
//! address is used as the SMTP username and its credential as the password.

use async_trait::async_trait;
use lettre::message::{Mailbox, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt::Debug;
use std::time::Duration;

use crate::prelude::*;

/// A fully rendered message ready for delivery
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
	pub from: String,
	pub to: String,
	pub subject: String,
	pub html: String,
}

#[async_trait]
pub trait MailTransport: Debug + Send + Sync {
	/// Deliver one message, authenticating as `email.from` with `credential`
	async fn send(&self, email: &OutgoingEmail, credential: &str) -> ClResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
	None,
	#[default]
	StartTls,
	Tls,
}

impl std::str::FromStr for TlsMode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"none" => Ok(TlsMode::None),
			"starttls" => Ok(TlsMode::StartTls),
			"tls" => Ok(TlsMode::Tls),
			_ => Err(Error::ConfigError(format!(
				"Invalid TLS mode: {}. Must be 'none', 'starttls', or 'tls'",
				s
			))),
		}
	}
}

#[derive(Debug, Clone)]
pub struct SmtpSettings {
	pub host: String,
	pub port: u16,
	pub tls_mode: TlsMode,
	pub timeout: Duration,
}

impl Default for SmtpSettings {
	fn default() -> Self {
		Self {
			host: "localhost".into(),
			port: 587,
			tls_mode: TlsMode::StartTls,
			timeout: Duration::from_secs(30),
		}
	}
}

/// SMTP email sender
#[derive(Debug)]
pub struct SmtpMailer {
	settings: SmtpSettings,
}

impl SmtpMailer {
	pub fn new(settings: SmtpSettings) -> Self {
		Self { settings }
	}

	fn tls(&self) -> ClResult<Tls> {
		let params = || {
			TlsParameters::builder(self.settings.host.clone())
				.build()
				.map_err(|e| Error::ConfigError(format!("TLS configuration error: {}", e)))
		};

		Ok(match self.settings.tls_mode {
			TlsMode::Tls => Tls::Wrapper(params()?),
			TlsMode::StartTls => Tls::Opportunistic(params()?),
			TlsMode::None => Tls::None,
		})
	}
}

/// Build the MIME message, validating both addresses
pub fn build_message(email: &OutgoingEmail) -> ClResult<Message> {
	let from: Mailbox = email
		.from
		.trim()
		.parse()
		.map_err(|_| Error::ValidationError("Invalid from email format".into()))?;
	let to: Mailbox = email
		.to
		.trim()
		.parse()
		.map_err(|_| Error::ValidationError("Invalid recipient email format".into()))?;

	Message::builder()
		.from(from)
		.to(to)
		.subject(email.subject.as_str())
		.singlepart(SinglePart::html(email.html.clone()))
		.map_err(|e| Error::ValidationError(format!("Failed to build email: {}", e)))
}

#[async_trait]
impl MailTransport for SmtpMailer {
	async fn send(&self, email: &OutgoingEmail, credential: &str) -> ClResult<()> {
		debug!(
			"Sending email to {} via {}:{} with TLS mode: {:?}",
			email.to, self.settings.host, self.settings.port, self.settings.tls_mode
		);

		let message = build_message(email)?;

		let credentials = Credentials::new(email.from.trim().to_string(), credential.to_string());
		let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.settings.host)
			.port(self.settings.port)
			.timeout(Some(self.settings.timeout))
			.tls(self.tls()?)
			.credentials(credentials)
			.build();

		match mailer.send(message).await {
			Ok(response) => {
				info!("Email sent successfully to {} (response: {:?})", email.to, response.code());
				Ok(())
			}
			Err(e) => {
				warn!("Failed to send email to {}: {}", email.to, e);
				Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", e)))
			}
		}
	}
}


// vim: ts=4
