//! Adapter that manages the relational store. License and contact records are
//! owned by the HR application and only read here; preferences and sender
//! configuration are single rows; the notification log is append-only.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

pub const DAYS_MIN: i64 = 1;
pub const DAYS_MAX: i64 = 365;
pub const DEFAULT_DAYS_BEFORE: i64 = 30;
pub const DEFAULT_EXPIRED_WITHIN_DAYS: i64 = 7;
pub const DEFAULT_SEND_TIME: &str = "09:00";

fn check_days(field: &str, value: i64) -> ClResult<()> {
	if (DAYS_MIN..=DAYS_MAX).contains(&value) {
		Ok(())
	} else {
		Err(Error::ValidationError(format!(
			"{} must be between {} and {} (got {})",
			field, DAYS_MIN, DAYS_MAX, value
		)))
	}
}

/// Parse an `HH:MM` (or `HH:MM:SS`) send time
pub fn parse_send_time(value: &str) -> Option<NaiveTime> {
	let value = value.trim();
	NaiveTime::parse_from_str(value, "%H:%M")
		.or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
		.ok()
}

/// License row. Expiration dates are kept exactly as stored; the scanner
/// decides what is parsable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LicenseRecord {
	pub applicant_id: ApplicantId,
	pub security_expiration: Option<Box<str>>,
	pub driver_expiration: Option<Box<str>>,
	pub firearm_expiration: Option<Box<str>>,
}

impl LicenseRecord {
	pub fn expiration(&self, typ: LicenseType) -> Option<&str> {
		match typ {
			LicenseType::Security => self.security_expiration.as_deref(),
			LicenseType::Driver => self.driver_expiration.as_deref(),
			LicenseType::Firearm => self.firearm_expiration.as_deref(),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactRecord {
	pub applicant_id: ApplicantId,
	pub first_name: Option<Box<str>>,
	pub last_name: Option<Box<str>>,
	pub email: Option<Box<str>>,
	pub phone: Option<Box<str>>,
}

/// "First Last" from optional name parts, blanks dropped
pub fn display_name(first_name: Option<&str>, last_name: Option<&str>) -> String {
	[first_name, last_name]
		.into_iter()
		.flatten()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join(" ")
}

/// Shared notification preferences (single row)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
	pub enabled: bool,
	pub days_before: i64,
	pub include_security: bool,
	pub include_driver: bool,
	pub include_firearm: bool,
	/// Local send time, `HH:MM`
	pub send_time: Box<str>,
	/// Informational label, dates are evaluated in the process-local timezone
	pub timezone: Box<str>,
	#[serde(default)]
	pub updated_at: Timestamp,
}

impl Default for NotificationPreferences {
	fn default() -> Self {
		Self {
			enabled: false,
			days_before: DEFAULT_DAYS_BEFORE,
			include_security: true,
			include_driver: true,
			include_firearm: true,
			send_time: DEFAULT_SEND_TIME.into(),
			timezone: "local".into(),
			updated_at: Timestamp(0),
		}
	}
}

impl NotificationPreferences {
	/// Days-before threshold clamped into the valid range
	pub fn threshold(&self) -> i64 {
		self.days_before.clamp(DAYS_MIN, DAYS_MAX)
	}

	/// Configured send time, falling back to the default on garbage
	pub fn send_time(&self) -> NaiveTime {
		parse_send_time(&self.send_time)
			.or_else(|| parse_send_time(DEFAULT_SEND_TIME))
			.unwrap_or(NaiveTime::MIN)
	}

	pub fn includes(&self, typ: LicenseType) -> bool {
		match typ {
			LicenseType::Security => self.include_security,
			LicenseType::Driver => self.include_driver,
			LicenseType::Firearm => self.include_firearm,
		}
	}

	pub fn enabled_types(&self) -> Vec<LicenseType> {
		LicenseType::ALL.into_iter().filter(|typ| self.includes(*typ)).collect()
	}

	/// Reject values a writer must never persist
	pub fn validate(&self) -> ClResult<()> {
		check_days("daysBefore", self.days_before)?;
		if parse_send_time(&self.send_time).is_none() {
			return Err(Error::ValidationError(format!(
				"sendTime must be HH:MM (got {:?})",
				self.send_time
			)));
		}
		Ok(())
	}
}

/// Device-local preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalPreferences {
	pub include_expired: bool,
	pub expired_within_days: i64,
}

impl Default for LocalPreferences {
	fn default() -> Self {
		Self { include_expired: false, expired_within_days: DEFAULT_EXPIRED_WITHIN_DAYS }
	}
}

impl LocalPreferences {
	pub fn expired_window(&self) -> i64 {
		self.expired_within_days.clamp(DAYS_MIN, DAYS_MAX)
	}

	pub fn validate(&self) -> ClResult<()> {
		check_days("expiredWithinDays", self.expired_within_days)
	}
}

/// Outbound identity (single row per provider)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SenderConfig {
	pub provider: Box<str>,
	pub sender_email: Option<Box<str>>,
	/// Transport credential, write-only over the API
	#[serde(default, skip_serializing)]
	pub credential: Option<Box<str>>,
	pub active: bool,
	/// Free-text template notes (structured JSON or legacy plain text)
	pub template_notes: Option<Box<str>>,
	#[serde(default)]
	pub updated_at: Timestamp,
}

impl SenderConfig {
	pub fn sender_email(&self) -> Option<&str> {
		self.sender_email.as_deref().map(str::trim).filter(|s| !s.is_empty())
	}

	pub fn credential(&self) -> Option<&str> {
		self.credential.as_deref().filter(|s| !s.trim().is_empty())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogStatus {
	Sent,
	Failed,
	Skipped,
}

impl LogStatus {
	pub fn as_str(&self) -> &'static str {
		match self {
			LogStatus::Sent => "SENT",
			LogStatus::Failed => "FAILED",
			LogStatus::Skipped => "SKIPPED",
		}
	}
}

impl std::str::FromStr for LogStatus {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"SENT" => Ok(LogStatus::Sent),
			"FAILED" => Ok(LogStatus::Failed),
			"SKIPPED" => Ok(LogStatus::Skipped),
			_ => Err(Error::ValidationError(format!("unknown log status: {}", s))),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
	pub applicant_id: ApplicantId,
	pub license_type: LicenseType,
	pub expiry_date: NaiveDate,
	pub recipient: Option<Box<str>>,
	pub status: LogStatus,
	pub error: Option<Box<str>>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
	pub log_id: i64,
	pub applicant_id: ApplicantId,
	pub license_type: LicenseType,
	pub expiry_date: NaiveDate,
	pub recipient: Option<Box<str>>,
	pub status: LogStatus,
	pub error: Option<Box<str>>,
	pub created_at: Timestamp,
}

/// Options for querying the notification log
#[derive(Debug, Default, Clone)]
pub struct ListLogOptions {
	pub status: Option<LogStatus>,
	/// Only entries created at or after this timestamp
	pub created_after: Option<Timestamp>,
	pub limit: Option<u32>,
}

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	// License records
	//*****************
	async fn list_license_records(&self) -> ClResult<Vec<LicenseRecord>>;

	// Contacts
	//**********
	/// Look up contacts by applicant id. Unknown ids are simply absent from
	/// the result.
	async fn list_contacts(&self, applicant_ids: &[ApplicantId]) -> ClResult<Vec<ContactRecord>>;

	// Configuration rows
	//********************
	/// Most recently updated active sender config of a provider
	async fn read_sender_config(&self, provider: &str) -> ClResult<Option<SenderConfig>>;
	/// Stored sender config of a provider whether or not it is active
	async fn read_sender_settings(&self, provider: &str) -> ClResult<Option<SenderConfig>>;
	async fn upsert_sender_config(&self, config: &SenderConfig) -> ClResult<()>;

	/// Most recently updated preferences row
	async fn read_notification_prefs(&self) -> ClResult<Option<NotificationPreferences>>;
	async fn upsert_notification_prefs(&self, prefs: &NotificationPreferences) -> ClResult<()>;

	// Notification log
	//******************
	async fn create_log_entry(&self, entry: &NewLogEntry) -> ClResult<()>;
	/// Newest first
	async fn list_log_entries(&self, opts: &ListLogOptions) -> ClResult<Vec<LogEntry>>;
}


// vim: ts=4
