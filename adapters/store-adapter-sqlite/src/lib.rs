//! SQLite implementation of the licwatch store adapter

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use licwatch::prelude::*;
use licwatch::store_adapter::{
	ContactRecord, LicenseRecord, ListLogOptions, LogEntry, NewLogEntry, NotificationPreferences,
	SenderConfig, StoreAdapter,
};

mod config;
mod contact;
mod license;
mod log;
mod schema;

// Helper functions
//******************
fn push_in<'a>(mut query: sqlx::QueryBuilder<'a, sqlx::Sqlite>, values: &[i64]) -> sqlx::QueryBuilder<'a, sqlx::Sqlite> {
	query.push("(");
	for (i, value) in values.iter().enumerate() {
		if i > 0 {
			query.push(", ");
		}
		query.push_bind(*value);
	}
	query.push(")");
	query
}

fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

#[derive(Debug)]
pub struct StoreAdapterSqlite {
	db: SqlitePool,
}

impl StoreAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		if let Some(dir) = path.as_ref().parent().filter(|dir| !dir.as_os_str().is_empty()) {
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.or(Err(Error::DbError))?;

		schema::init_db(&db).await.inspect_err(inspect).or(Err(Error::DbError))?;

		info!("Opened store database at {}", path.as_ref().display());
		Ok(Self { db })
	}

	/// Insert or replace a license record. Used when importing HR data.
	pub async fn upsert_license_record(&self, record: &LicenseRecord) -> ClResult<()> {
		license::upsert(&self.db, record).await
	}

	/// Insert or replace a contact. Used when importing HR data.
	pub async fn upsert_contact(&self, contact: &ContactRecord) -> ClResult<()> {
		contact::upsert(&self.db, contact).await
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterSqlite {
	// License records
	//*****************
	async fn list_license_records(&self) -> ClResult<Vec<LicenseRecord>> {
		license::list(&self.db).await
	}

	// Contacts
	//**********
	async fn list_contacts(&self, applicant_ids: &[ApplicantId]) -> ClResult<Vec<ContactRecord>> {
		contact::list(&self.db, applicant_ids).await
	}

	// Configuration rows
	//********************
	async fn read_sender_config(&self, provider: &str) -> ClResult<Option<SenderConfig>> {
		config::read_sender(&self.db, provider, true).await
	}

	async fn read_sender_settings(&self, provider: &str) -> ClResult<Option<SenderConfig>> {
		config::read_sender(&self.db, provider, false).await
	}

	async fn upsert_sender_config(&self, config: &SenderConfig) -> ClResult<()> {
		config::upsert_sender(&self.db, config).await
	}

	async fn read_notification_prefs(&self) -> ClResult<Option<NotificationPreferences>> {
		config::read_prefs(&self.db).await
	}

	async fn upsert_notification_prefs(&self, prefs: &NotificationPreferences) -> ClResult<()> {
		config::upsert_prefs(&self.db, prefs).await
	}

	// Notification log
	//******************
	async fn create_log_entry(&self, entry: &NewLogEntry) -> ClResult<()> {
		log::create(&self.db, entry).await
	}

	async fn list_log_entries(&self, opts: &ListLogOptions) -> ClResult<Vec<LogEntry>> {
		log::list(&self.db, opts).await
	}
}

// vim: ts=4
