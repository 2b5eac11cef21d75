//! Store adapter tests against a temporary SQLite database

use chrono::NaiveDate;
use licwatch::store_adapter::{
	ContactRecord, LicenseRecord, ListLogOptions, LogStatus, NewLogEntry, NotificationPreferences,
	SenderConfig, StoreAdapter,
};
use licwatch::types::{ApplicantId, LicenseType, Timestamp};
use licwatch_store_adapter_sqlite::StoreAdapterSqlite;
use tempfile::TempDir;

async fn create_test_adapter() -> (StoreAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = StoreAdapterSqlite::new(temp_dir.path().join("licwatch.db"))
		.await
		.expect("Failed to create adapter");
	(adapter, temp_dir)
}

fn contact(id: i64, email: Option<&str>) -> ContactRecord {
	ContactRecord {
		applicant_id: ApplicantId(id),
		first_name: Some("Ada".into()),
		last_name: Some("Lovelace".into()),
		email: email.map(Into::into),
		phone: Some("555-0100".into()),
	}
}

fn log_entry(id: i64, status: LogStatus, created_at: i64) -> NewLogEntry {
	NewLogEntry {
		applicant_id: ApplicantId(id),
		license_type: LicenseType::Driver,
		expiry_date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
		recipient: Some("ada@example.com".into()),
		status,
		error: (status == LogStatus::Failed).then(|| "SMTP send failed: refused".into()),
		created_at: Timestamp(created_at),
	}
}

#[tokio::test]
async fn test_license_records_keep_raw_dates() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter
		.upsert_license_record(&LicenseRecord {
			applicant_id: ApplicantId(7),
			security_expiration: Some("2024-01-10T00:00:00".into()),
			driver_expiration: Some("not a date".into()),
			firearm_expiration: None,
		})
		.await
		.unwrap();

	let records = adapter.list_license_records().await.unwrap();
	assert_eq!(records.len(), 1);
	assert_eq!(records[0].expiration(LicenseType::Security), Some("2024-01-10T00:00:00"));
	assert_eq!(records[0].expiration(LicenseType::Driver), Some("not a date"));
	assert_eq!(records[0].expiration(LicenseType::Firearm), None);
}

#[tokio::test]
async fn test_list_contacts_by_ids() {
	let (adapter, _temp) = create_test_adapter().await;
	for id in 1..=5 {
		adapter.upsert_contact(&contact(id, Some("ada@example.com"))).await.unwrap();
	}

	let mut found = adapter.list_contacts(&[ApplicantId(2), ApplicantId(4), ApplicantId(99)]).await.unwrap();
	found.sort_by_key(|c| c.applicant_id);
	let ids: Vec<i64> = found.iter().map(|c| c.applicant_id.0).collect();
	assert_eq!(ids, vec![2, 4]);

	assert!(adapter.list_contacts(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_sender_config_upsert_keeps_credential() {
	let (adapter, _temp) = create_test_adapter().await;
	assert!(adapter.read_sender_config("smtp").await.unwrap().is_none());

	let cfg = SenderConfig {
		provider: "smtp".into(),
		sender_email: Some("hr@example.com".into()),
		credential: Some("app-password".into()),
		active: true,
		template_notes: Some("Please renew".into()),
		updated_at: Timestamp(100),
	};
	adapter.upsert_sender_config(&cfg).await.unwrap();

	let update = SenderConfig { credential: None, sender_email: Some("ops@example.com".into()), updated_at: Timestamp(200), ..cfg };
	adapter.upsert_sender_config(&update).await.unwrap();

	let stored = adapter.read_sender_config("smtp").await.unwrap().unwrap();
	assert_eq!(stored.sender_email.as_deref(), Some("ops@example.com"));
	assert_eq!(stored.credential.as_deref(), Some("app-password"));
	assert_eq!(stored.updated_at, Timestamp(200));

	// inactive configs are not returned to the pipeline, but stay visible as settings
	adapter.upsert_sender_config(&SenderConfig { active: false, ..update }).await.unwrap();
	assert!(adapter.read_sender_config("smtp").await.unwrap().is_none());
	let settings = adapter.read_sender_settings("smtp").await.unwrap().unwrap();
	assert!(!settings.active);
	assert_eq!(settings.sender_email.as_deref(), Some("ops@example.com"));
	assert!(adapter.read_sender_settings("other").await.unwrap().is_none());
}

#[tokio::test]
async fn test_notification_prefs_round_trip() {
	let (adapter, _temp) = create_test_adapter().await;
	assert!(adapter.read_notification_prefs().await.unwrap().is_none());

	let prefs = NotificationPreferences {
		enabled: true,
		days_before: 45,
		include_firearm: false,
		send_time: "07:30".into(),
		updated_at: Timestamp(1_700_000_000),
		..Default::default()
	};
	adapter.upsert_notification_prefs(&prefs).await.unwrap();
	adapter.upsert_notification_prefs(&NotificationPreferences { days_before: 60, ..prefs }).await.unwrap();

	let stored = adapter.read_notification_prefs().await.unwrap().unwrap();
	assert!(stored.enabled);
	assert_eq!(stored.days_before, 60);
	assert!(!stored.include_firearm);
	assert_eq!(stored.enabled_types(), vec![LicenseType::Security, LicenseType::Driver]);
	assert_eq!(&*stored.send_time, "07:30");
}

#[tokio::test]
async fn test_log_entries_filter_and_order() {
	let (adapter, _temp) = create_test_adapter().await;

	adapter.create_log_entry(&log_entry(1, LogStatus::Sent, 1000)).await.unwrap();
	adapter.create_log_entry(&log_entry(2, LogStatus::Failed, 2000)).await.unwrap();
	adapter.create_log_entry(&log_entry(3, LogStatus::Sent, 3000)).await.unwrap();
	adapter.create_log_entry(&log_entry(4, LogStatus::Skipped, 3000)).await.unwrap();

	let all = adapter.list_log_entries(&ListLogOptions::default()).await.unwrap();
	let ids: Vec<i64> = all.iter().map(|e| e.applicant_id.0).collect();
	assert_eq!(ids, vec![4, 3, 2, 1]);
	assert_eq!(all[2].error.as_deref(), Some("SMTP send failed: refused"));
	assert_eq!(all[0].expiry_date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());

	let sent_today = adapter
		.list_log_entries(&ListLogOptions {
			status: Some(LogStatus::Sent),
			created_after: Some(Timestamp(2000)),
			limit: None,
		})
		.await
		.unwrap();
	assert_eq!(sent_today.len(), 1);
	assert_eq!(sent_today[0].applicant_id, ApplicantId(3));
	assert_eq!(sent_today[0].license_type, LicenseType::Driver);

	let limited = adapter.list_log_entries(&ListLogOptions { limit: Some(2), ..Default::default() }).await.unwrap();
	assert_eq!(limited.len(), 2);
}

// vim: ts=4
