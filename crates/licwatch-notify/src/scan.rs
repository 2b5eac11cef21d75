//! Expiry scanner
//!
//! Computes the signed day offset of every expiration date against the local
//! "today" and keeps the ones inside the notification window.

use chrono::NaiveDate;
use serde::Serialize;

use crate::prelude::*;
use licwatch_types::store_adapter::{
	ContactRecord, LicenseRecord, LocalPreferences, NotificationPreferences, display_name,
};

/// One license nearing or past expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiringItem {
	pub applicant_id: ApplicantId,
	pub license_type: LicenseType,
	pub expiry_date: NaiveDate,
	/// Negative once expired
	pub days_until_expiry: i64,
	pub first_name: Option<Box<str>>,
	pub last_name: Option<Box<str>>,
	pub email: Option<Box<str>>,
	pub phone: Option<Box<str>>,
}

impl ExpiringItem {
	pub fn attach_contact(&mut self, contact: &ContactRecord) {
		self.first_name.clone_from(&contact.first_name);
		self.last_name.clone_from(&contact.last_name);
		self.email.clone_from(&contact.email);
		self.phone.clone_from(&contact.phone);
	}

	/// Trimmed recipient address, `None` when missing or blank
	pub fn recipient(&self) -> Option<&str> {
		self.email.as_deref().map(str::trim).filter(|s| !s.is_empty())
	}

	pub fn full_name(&self) -> String {
		display_name(self.first_name.as_deref(), self.last_name.as_deref())
	}

	/// Key used by the dedup gate
	pub fn dedup_key(&self) -> (ApplicantId, LicenseType, NaiveDate) {
		(self.applicant_id, self.license_type, self.expiry_date)
	}
}

/// Inclusion window for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
	pub threshold: i64,
	pub include_expired: bool,
	pub expired_within_days: i64,
}

impl ScanWindow {
	pub fn new(prefs: &NotificationPreferences, local: &LocalPreferences) -> Self {
		Self {
			threshold: prefs.threshold(),
			include_expired: local.include_expired,
			expired_within_days: local.expired_window(),
		}
	}

	pub fn includes(&self, offset: i64) -> bool {
		(0..=self.threshold).contains(&offset)
			|| (self.include_expired && offset < 0 && offset.abs() <= self.expired_within_days)
	}
}

/// Parse a stored expiration date. Accepts `YYYY-MM-DD` optionally followed
/// by a time part (`T...` or ` ...`), which is ignored.
pub fn parse_expiry_date(raw: &str) -> Option<NaiveDate> {
	let raw = raw.trim();
	let (date, rest) = raw.split_at_checked(10)?;
	if !(rest.is_empty() || rest.starts_with('T') || rest.starts_with(' ')) {
		return None;
	}
	NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Select every expiring license of the enabled types. One record yields up
/// to one item per type; the result is unsorted.
pub fn scan(
	records: &[LicenseRecord],
	types: &[LicenseType],
	window: ScanWindow,
	today: NaiveDate,
) -> Vec<ExpiringItem> {
	let mut items = Vec::new();

	for record in records {
		for &typ in types {
			let Some(expiry_date) = record.expiration(typ).and_then(parse_expiry_date) else {
				continue;
			};
			let offset = (expiry_date - today).num_days();
			if window.includes(offset) {
				items.push(ExpiringItem {
					applicant_id: record.applicant_id,
					license_type: typ,
					expiry_date,
					days_until_expiry: offset,
					first_name: None,
					last_name: None,
					email: None,
					phone: None,
				});
			}
		}
	}

	debug!("Scanned {} license records, {} expiring items", records.len(), items.len());
	items
}

#[cfg(test)]
mod tests {
	use super::*;

	fn date(s: &str) -> NaiveDate {
		NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
	}

	fn window(include_expired: bool, expired_within_days: i64) -> ScanWindow {
		ScanWindow { threshold: 30, include_expired, expired_within_days }
	}

	fn record(id: i64, security: Option<&str>, driver: Option<&str>, firearm: Option<&str>) -> LicenseRecord {
		LicenseRecord {
			applicant_id: ApplicantId(id),
			security_expiration: security.map(Into::into),
			driver_expiration: driver.map(Into::into),
			firearm_expiration: firearm.map(Into::into),
		}
	}

	#[test]
	fn test_parse_expiry_date_forms() {
		assert_eq!(parse_expiry_date("2024-01-10"), Some(date("2024-01-10")));
		assert_eq!(parse_expiry_date("2024-01-10T00:00:00Z"), Some(date("2024-01-10")));
		assert_eq!(parse_expiry_date(" 2024-01-10 13:45:00"), Some(date("2024-01-10")));
		assert_eq!(parse_expiry_date("2024-1-10"), None);
		assert_eq!(parse_expiry_date("2024-01-10x"), None);
		assert_eq!(parse_expiry_date("01/10/2024"), None);
		assert_eq!(parse_expiry_date(""), None);
		assert_eq!(parse_expiry_date("2024-02-30"), None);
	}

	#[test]
	fn test_security_nine_days_out_is_included() {
		let records = [record(1, Some("2024-01-10"), None, None)];
		let items = scan(&records, &LicenseType::ALL, window(false, 7), date("2024-01-01"));

		assert_eq!(items.len(), 1);
		assert_eq!(items[0].license_type, LicenseType::Security);
		assert_eq!(items[0].days_until_expiry, 9);
	}

	#[test]
	fn test_expired_beyond_window_is_excluded() {
		let records = [record(1, None, Some("2023-12-20"), None)];
		let items = scan(&records, &LicenseType::ALL, window(true, 7), date("2024-01-01"));
		assert!(items.is_empty());

		// within the window it is included with a negative offset
		let items = scan(&records, &LicenseType::ALL, window(true, 12), date("2024-01-01"));
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].days_until_expiry, -12);
	}

	#[test]
	fn test_expired_items_need_opt_in() {
		let records = [record(1, Some("2023-12-31"), None, None)];
		assert!(scan(&records, &LicenseType::ALL, window(false, 7), date("2024-01-01")).is_empty());
		assert_eq!(scan(&records, &LicenseType::ALL, window(true, 7), date("2024-01-01")).len(), 1);
	}

	#[test]
	fn test_threshold_bounds_and_types() {
		let today = date("2024-01-01");
		let records = [
			record(1, Some("2024-01-01"), Some("2024-01-31"), Some("2024-02-01")),
			record(2, Some("garbage"), None, Some("2024-01-15")),
		];

		let items = scan(&records, &LicenseType::ALL, window(false, 7), today);
		let keys: Vec<_> = items.iter().map(|i| (i.applicant_id.0, i.license_type, i.days_until_expiry)).collect();
		assert_eq!(
			keys,
			vec![
				(1, LicenseType::Security, 0),
				(1, LicenseType::Driver, 30),
				(2, LicenseType::Firearm, 14),
			]
		);

		// disabled types are never scanned
		let items = scan(&records, &[LicenseType::Driver], window(false, 7), today);
		assert_eq!(items.len(), 1);
		assert_eq!(items[0].license_type, LicenseType::Driver);
	}

	#[test]
	fn test_window_from_preferences_is_clamped() {
		let prefs = NotificationPreferences { days_before: 1000, ..Default::default() };
		let local = LocalPreferences { include_expired: true, expired_within_days: 0 };
		let window = ScanWindow::new(&prefs, &local);
		assert_eq!(window.threshold, 365);
		assert_eq!(window.expired_within_days, 1);
		assert!(window.includes(-1));
		assert!(!window.includes(-2));
	}

	#[test]
	fn test_recipient_is_trimmed() {
		let mut item = scan(&[record(1, Some("2024-01-02"), None, None)], &LicenseType::ALL, window(false, 7), date("2024-01-01"))
			.remove(0);
		assert_eq!(item.recipient(), None);
		item.email = Some("  a@x.com ".into());
		assert_eq!(item.recipient(), Some("a@x.com"));
		item.email = Some("   ".into());
		assert_eq!(item.recipient(), None);
	}
}

// vim: ts=4
