//! In-memory collaborators for pipeline tests

use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use std::sync::Mutex;

use licwatch_core::local_prefs::LocalPrefsStore;
use licwatch_email::{MailTransport, OutgoingEmail};
use licwatch_types::clock::ManualClock;
use licwatch_types::store_adapter::{
	ContactRecord, LicenseRecord, ListLogOptions, LocalPreferences, LogEntry, NewLogEntry,
	NotificationPreferences, SenderConfig,
};

use crate::prelude::*;
use crate::scan::ExpiringItem;

pub fn clock_at(s: &str) -> ManualClock {
	ManualClock::new(DateTime::parse_from_rfc3339(s).unwrap())
}

pub fn base_date() -> NaiveDate {
	NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Item expiring `days` after 2024-01-01
pub fn item(id: i64, license_type: LicenseType, days: i64) -> ExpiringItem {
	let expiry_date = if days >= 0 {
		base_date().checked_add_days(Days::new(days.unsigned_abs())).unwrap()
	} else {
		base_date().checked_sub_days(Days::new(days.unsigned_abs())).unwrap()
	};
	ExpiringItem {
		applicant_id: ApplicantId(id),
		license_type,
		expiry_date,
		days_until_expiry: days,
		first_name: None,
		last_name: None,
		email: None,
		phone: None,
	}
}

pub fn item_for(id: i64, license_type: LicenseType, email: Option<&str>) -> ExpiringItem {
	ExpiringItem { first_name: Some("Ada".into()), email: email.map(Into::into), ..item(id, license_type, 5) }
}

pub fn log(item: &ExpiringItem, status: licwatch_types::store_adapter::LogStatus, created_at: Timestamp) -> NewLogEntry {
	NewLogEntry {
		applicant_id: item.applicant_id,
		license_type: item.license_type,
		expiry_date: item.expiry_date,
		recipient: item.email.clone(),
		status,
		error: None,
		created_at,
	}
}

pub fn sender(email: &str) -> SenderConfig {
	SenderConfig {
		provider: "smtp".into(),
		sender_email: Some(email.into()),
		credential: Some("app-password".into()),
		active: true,
		template_notes: None,
		updated_at: Timestamp(0),
	}
}

// MemoryStore
//*************
#[derive(Debug, Default)]
struct StoreData {
	licenses: Vec<LicenseRecord>,
	contacts: Vec<ContactRecord>,
	sender: Option<SenderConfig>,
	prefs: Option<NotificationPreferences>,
	logs: Vec<LogEntry>,
	contact_lookups: Vec<usize>,
	fail_reads: bool,
	fail_log_writes: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	data: Mutex<StoreData>,
}

impl MemoryStore {
	pub fn add_license(&self, record: LicenseRecord) {
		self.data.lock().unwrap().licenses.push(record);
	}

	pub fn add_contact(&self, id: i64, first: &str, last: &str, email: Option<&str>) {
		self.data.lock().unwrap().contacts.push(ContactRecord {
			applicant_id: ApplicantId(id),
			first_name: Some(first.into()),
			last_name: Some(last.into()),
			email: email.map(Into::into),
			phone: None,
		});
	}

	pub fn set_sender(&self, sender: SenderConfig) {
		self.data.lock().unwrap().sender = Some(sender);
	}

	pub fn set_prefs(&self, prefs: NotificationPreferences) {
		self.data.lock().unwrap().prefs = Some(prefs);
	}

	pub fn prefs(&self) -> Option<NotificationPreferences> {
		self.data.lock().unwrap().prefs.clone()
	}

	pub fn sender(&self) -> Option<SenderConfig> {
		self.data.lock().unwrap().sender.clone()
	}

	pub fn push_log(&self, entry: NewLogEntry) {
		let mut data = self.data.lock().unwrap();
		let log_id = i64::try_from(data.logs.len()).unwrap() + 1;
		data.logs.push(LogEntry {
			log_id,
			applicant_id: entry.applicant_id,
			license_type: entry.license_type,
			expiry_date: entry.expiry_date,
			recipient: entry.recipient,
			status: entry.status,
			error: entry.error,
			created_at: entry.created_at,
		});
	}

	pub fn logs(&self) -> Vec<LogEntry> {
		self.data.lock().unwrap().logs.clone()
	}

	pub fn contact_lookups(&self) -> Vec<usize> {
		self.data.lock().unwrap().contact_lookups.clone()
	}

	pub fn fail_reads(&self, fail: bool) {
		self.data.lock().unwrap().fail_reads = fail;
	}

	pub fn fail_log_writes(&self, fail: bool) {
		self.data.lock().unwrap().fail_log_writes = fail;
	}

	fn check_read(&self) -> ClResult<()> {
		if self.data.lock().unwrap().fail_reads { Err(Error::DbError) } else { Ok(()) }
	}
}

#[async_trait]
impl StoreAdapter for MemoryStore {
	async fn list_license_records(&self) -> ClResult<Vec<LicenseRecord>> {
		self.check_read()?;
		Ok(self.data.lock().unwrap().licenses.clone())
	}

	async fn list_contacts(&self, applicant_ids: &[ApplicantId]) -> ClResult<Vec<ContactRecord>> {
		self.check_read()?;
		let mut data = self.data.lock().unwrap();
		data.contact_lookups.push(applicant_ids.len());
		Ok(data.contacts.iter().filter(|c| applicant_ids.contains(&c.applicant_id)).cloned().collect())
	}

	async fn read_sender_config(&self, provider: &str) -> ClResult<Option<SenderConfig>> {
		self.check_read()?;
		let data = self.data.lock().unwrap();
		Ok(data.sender.clone().filter(|s| &*s.provider == provider && s.active))
	}

	async fn read_sender_settings(&self, provider: &str) -> ClResult<Option<SenderConfig>> {
		self.check_read()?;
		let data = self.data.lock().unwrap();
		Ok(data.sender.clone().filter(|s| &*s.provider == provider))
	}

	async fn upsert_sender_config(&self, config: &SenderConfig) -> ClResult<()> {
		let mut data = self.data.lock().unwrap();
		let mut config = config.clone();
		if config.credential.is_none() {
			config.credential = data.sender.as_ref().and_then(|s| s.credential.clone());
		}
		data.sender = Some(config);
		Ok(())
	}

	async fn read_notification_prefs(&self) -> ClResult<Option<NotificationPreferences>> {
		self.check_read()?;
		Ok(self.data.lock().unwrap().prefs.clone())
	}

	async fn upsert_notification_prefs(&self, prefs: &NotificationPreferences) -> ClResult<()> {
		self.data.lock().unwrap().prefs = Some(prefs.clone());
		Ok(())
	}

	async fn create_log_entry(&self, entry: &NewLogEntry) -> ClResult<()> {
		if self.data.lock().unwrap().fail_log_writes {
			return Err(Error::DbError);
		}
		self.push_log(entry.clone());
		Ok(())
	}

	async fn list_log_entries(&self, opts: &ListLogOptions) -> ClResult<Vec<LogEntry>> {
		self.check_read()?;
		let mut logs: Vec<LogEntry> = self
			.logs()
			.into_iter()
			.filter(|l| opts.status.is_none_or(|s| l.status == s))
			.filter(|l| opts.created_after.is_none_or(|t| l.created_at >= t))
			.collect();
		logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.log_id.cmp(&a.log_id)));
		if let Some(limit) = opts.limit {
			logs.truncate(limit as usize);
		}
		Ok(logs)
	}
}

// MemoryLocalPrefs
//******************
#[derive(Debug, Default)]
pub struct MemoryLocalPrefs {
	prefs: Mutex<Option<LocalPreferences>>,
}

impl MemoryLocalPrefs {
	pub fn with(prefs: LocalPreferences) -> Self {
		Self { prefs: Mutex::new(Some(prefs)) }
	}
}

#[async_trait]
impl LocalPrefsStore for MemoryLocalPrefs {
	async fn load(&self) -> LocalPreferences {
		self.prefs.lock().unwrap().clone().unwrap_or_default()
	}

	async fn save(&self, prefs: &LocalPreferences) -> ClResult<()> {
		prefs.validate()?;
		*self.prefs.lock().unwrap() = Some(prefs.clone());
		Ok(())
	}
}

// FakeTransport
//***************
#[derive(Debug, Default)]
pub struct FakeTransport {
	sent: Mutex<Vec<OutgoingEmail>>,
	credentials: Mutex<Vec<String>>,
	failures: Mutex<Vec<(String, String)>>,
}

impl FakeTransport {
	pub fn fail_for(&self, to: &str, message: &str) {
		self.failures.lock().unwrap().push((to.to_string(), message.to_string()));
	}

	pub fn sent(&self) -> Vec<OutgoingEmail> {
		self.sent.lock().unwrap().clone()
	}

	pub fn credentials(&self) -> Vec<String> {
		self.credentials.lock().unwrap().clone()
	}
}

#[async_trait]
impl MailTransport for FakeTransport {
	async fn send(&self, email: &OutgoingEmail, credential: &str) -> ClResult<()> {
		self.credentials.lock().unwrap().push(credential.to_string());
		let failure = self.failures.lock().unwrap().iter().find(|(to, _)| *to == email.to).cloned();
		if let Some((_, message)) = failure {
			return Err(Error::ServiceUnavailable(format!("SMTP send failed: {}", message)));
		}
		self.sent.lock().unwrap().push(email.clone());
		Ok(())
	}
}

// vim: ts=4
