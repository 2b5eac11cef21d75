//! License-expiry notification pipeline
//!
//! A run loads the configuration, scans license records for expiring
//! entries, resolves contacts, drops items already sent today, groups the
//! rest by recipient, sends one notice per recipient and records one log
//! entry per item. Runs are serialized, whether triggered by the daily
//! scheduler or by an operator.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod config;
pub mod contacts;
pub mod dedup;
pub mod dispatch;
pub mod group;
pub mod handler;
pub mod scan;

mod prelude;
#[cfg(test)]
mod testing;

use async_trait::async_trait;
use chrono::{Days, NaiveTime};
use serde::Serialize;
use std::sync::Arc;

use licwatch_core::local_prefs::LocalPrefsStore;
use licwatch_core::scheduler::DailyJob;
use licwatch_email::template::render_subject;
use licwatch_email::{MailTransport, NoticeRow, OutgoingEmail, TemplateRenderer};
use licwatch_types::clock::Clock;
use licwatch_types::store_adapter::{
	ListLogOptions, LocalPreferences, LogEntry, LogStatus, NotificationPreferences, SenderConfig,
};

use crate::dispatch::Dispatcher;
use crate::prelude::*;

pub use dispatch::RunSummary;
pub use scan::ExpiringItem;

pub const DEFAULT_PREVIEW_LIMIT: u32 = 100;
pub const DEFAULT_LOG_LIMIT: u32 = 100;
pub const MAX_LIST_LIMIT: u32 = 1000;
/// Days ahead of the synthetic item in a test email
const TEST_EMAIL_DAYS: u64 = 30;

pub type NotifyApp = Arc<NotifyModule>;

/// Result of an operator triggered run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
	pub summary: RunSummary,
	pub message: String,
}

impl RunReport {
	fn new(summary: RunSummary) -> Self {
		let message = if summary.sent + summary.failed + summary.skipped == 0 {
			"No expiring licenses require a notification".to_string()
		} else {
			format!(
				"Sent {} notification(s), {} failed, {} skipped",
				summary.sent, summary.failed, summary.skipped
			)
		};
		Self { summary, message }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct TestEmailReport {
	pub to: String,
	pub subject: String,
}

fn list_limit(limit: Option<u32>, default: u32) -> u32 {
	limit.unwrap_or(default).clamp(1, MAX_LIST_LIMIT)
}

/// Notification module - orchestrates the pipeline and its configuration
pub struct NotifyModule {
	store: Arc<dyn StoreAdapter>,
	local_prefs: Arc<dyn LocalPrefsStore>,
	transport: Arc<dyn MailTransport>,
	clock: Arc<dyn Clock>,
	renderer: TemplateRenderer,
	provider: Box<str>,
	in_flight: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for NotifyModule {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("NotifyModule").field("provider", &self.provider).finish_non_exhaustive()
	}
}

impl NotifyModule {
	pub fn new(
		store: Arc<dyn StoreAdapter>,
		local_prefs: Arc<dyn LocalPrefsStore>,
		transport: Arc<dyn MailTransport>,
		clock: Arc<dyn Clock>,
		provider: &str,
	) -> ClResult<Self> {
		Ok(Self {
			store,
			local_prefs,
			transport,
			clock,
			renderer: TemplateRenderer::new()?,
			provider: provider.into(),
			in_flight: tokio::sync::Mutex::new(()),
		})
	}

	/// Expiring items with their contacts, before dedup and grouping
	async fn expiring_items(&self, cfg: &config::RunConfig) -> ClResult<Vec<ExpiringItem>> {
		let types = cfg.prefs.enabled_types();
		let window = scan::ScanWindow::new(&cfg.prefs, &cfg.local);
		let records = self.store.list_license_records().await?;
		let items = scan::scan(&records, &types, window, self.clock.today());
		contacts::resolve(self.store.as_ref(), items).await
	}

	/// Execute one full pipeline run
	pub async fn run_pipeline(&self) -> ClResult<RunSummary> {
		let _in_flight = self.in_flight.lock().await;

		let cfg = config::load(self.store.as_ref(), self.local_prefs.as_ref(), &self.provider).await?;
		let identity = cfg.sender_identity()?;

		let items = self.expiring_items(&cfg).await?;
		let items = dedup::filter_already_sent(self.store.as_ref(), self.clock.as_ref(), items).await?;
		let grouped = group::group(self.store.as_ref(), self.clock.as_ref(), items).await;

		let dispatcher = Dispatcher {
			store: self.store.as_ref(),
			transport: self.transport.as_ref(),
			renderer: &self.renderer,
			clock: self.clock.as_ref(),
			identity: &identity,
		};
		let mut summary = dispatcher.dispatch(&grouped.groups).await;
		summary.skipped += grouped.skipped;

		info!(
			"Notification run finished: {} sent, {} failed, {} skipped",
			summary.sent, summary.failed, summary.skipped
		);
		Ok(summary)
	}

	/// Operator triggered run. Only configuration and store errors are
	/// returned as errors, delivery failures are part of the summary.
	pub async fn run_now(&self) -> ClResult<RunReport> {
		info!("Manual notification run requested");
		Ok(RunReport::new(self.run_pipeline().await?))
	}

	/// Items a run would consider today, soonest first. Dedup is not applied.
	pub async fn preview_expiring(&self, limit: Option<u32>) -> ClResult<Vec<ExpiringItem>> {
		let cfg = config::load(self.store.as_ref(), self.local_prefs.as_ref(), &self.provider).await?;
		let mut items = self.expiring_items(&cfg).await?;
		items.sort_by(|a, b| {
			a.days_until_expiry
				.cmp(&b.days_until_expiry)
				.then(a.applicant_id.cmp(&b.applicant_id))
				.then(a.license_type.cmp(&b.license_type))
		});
		items.truncate(list_limit(limit, DEFAULT_PREVIEW_LIMIT) as usize);
		Ok(items)
	}

	pub async fn get_log(&self, status: Option<LogStatus>, limit: Option<u32>) -> ClResult<Vec<LogEntry>> {
		let opts = ListLogOptions {
			status,
			created_after: None,
			limit: Some(list_limit(limit, DEFAULT_LOG_LIMIT)),
		};
		self.store.list_log_entries(&opts).await
	}

	/// Send one synthetic notice, bypassing dedup, grouping and the log.
	/// Delivery errors are returned to the caller.
	pub async fn send_test_email(&self, to: Option<&str>, subject: Option<&str>) -> ClResult<TestEmailReport> {
		let cfg = config::load(self.store.as_ref(), self.local_prefs.as_ref(), &self.provider).await?;
		let identity = cfg.sender_identity()?;

		let to = to.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(identity.from.as_str()).to_string();
		if !to.contains('@') {
			return Err(Error::ValidationError("Invalid recipient email address".into()));
		}

		let today = self.clock.today();
		let expiry_date = today
			.checked_add_days(Days::new(TEST_EMAIL_DAYS))
			.ok_or_else(|| Error::Internal("test expiry date out of range".into()))?;
		let rows = [NoticeRow {
			license: LicenseType::Security.label().to_string(),
			expiry_date,
			days_until_expiry: (expiry_date - today).num_days(),
		}];

		let rendered = self.renderer.render(&identity.notes, "", &rows)?;
		let subject = match subject.map(str::trim).filter(|s| !s.is_empty()) {
			Some(subject) => render_subject(Some(subject), rows.len()),
			None => rendered.subject,
		};

		let email = OutgoingEmail { from: identity.from.clone(), to: to.clone(), subject, html: rendered.html };
		self.transport.send(&email, &identity.credential).await?;

		info!("Test email sent to {}", to);
		Ok(TestEmailReport { to, subject: email.subject })
	}

	pub async fn load_local_preferences(&self) -> LocalPreferences {
		self.local_prefs.load().await
	}

	pub async fn save_local_preferences(&self, prefs: &LocalPreferences) -> ClResult<LocalPreferences> {
		self.local_prefs.save(prefs).await?;
		Ok(prefs.clone())
	}

	pub async fn load_preferences(&self) -> ClResult<NotificationPreferences> {
		config::load_preferences(self.store.as_ref()).await
	}

	pub async fn save_preferences(&self, prefs: &NotificationPreferences) -> ClResult<NotificationPreferences> {
		prefs.validate()?;
		let prefs = NotificationPreferences {
			send_time: prefs.send_time().format("%H:%M").to_string().into(),
			updated_at: self.clock.timestamp(),
			..prefs.clone()
		};
		self.store.upsert_notification_prefs(&prefs).await?;
		info!("Notification preferences updated (enabled: {})", prefs.enabled);
		Ok(prefs)
	}

	pub async fn load_sender_config(&self) -> ClResult<Option<SenderConfig>> {
		self.store.read_sender_settings(&self.provider).await
	}

	/// Upsert the sender configuration of the configured provider. A missing
	/// credential keeps the stored one.
	pub async fn save_sender_config(&self, cfg: &SenderConfig) -> ClResult<SenderConfig> {
		if let Some(email) = cfg.sender_email()
			&& !email.contains('@')
		{
			return Err(Error::ValidationError("Invalid sender email address".into()));
		}

		let cfg = SenderConfig {
			provider: self.provider.clone(),
			sender_email: cfg.sender_email().map(Into::into),
			updated_at: self.clock.timestamp(),
			..cfg.clone()
		};
		self.store.upsert_sender_config(&cfg).await?;
		info!("Sender configuration for {} updated (active: {})", cfg.provider, cfg.active);
		Ok(cfg)
	}
}

#[async_trait]
impl DailyJob for NotifyModule {
	async fn schedule(&self) -> ClResult<Option<NaiveTime>> {
		let prefs = self.load_preferences().await?;
		if !prefs.enabled {
			return Ok(None);
		}
		match self.store.read_sender_config(&self.provider).await? {
			Some(sender) if sender.active => Ok(Some(prefs.send_time())),
			_ => Ok(None),
		}
	}

	async fn run(&self) -> ClResult<()> {
		self.run_pipeline().await.map(|_| ())
	}
}


// vim: ts=4
