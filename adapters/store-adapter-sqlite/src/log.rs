//! Notification log (append-only)

use chrono::NaiveDate;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use licwatch::prelude::*;
use licwatch::store_adapter::{ListLogOptions, LogEntry, NewLogEntry};

use crate::inspect;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) async fn create(db: &SqlitePool, entry: &NewLogEntry) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO notification_log (applicant_id, license_type, expiry_date, recipient, status, error, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(entry.applicant_id.0)
	.bind(entry.license_type.as_str())
	.bind(entry.expiry_date.format(DATE_FORMAT).to_string())
	.bind(entry.recipient.as_deref())
	.bind(entry.status.as_str())
	.bind(entry.error.as_deref())
	.bind(entry.created_at.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

fn read_entry(row: &SqliteRow) -> ClResult<LogEntry> {
	let get_err = |err: sqlx::Error| {
		inspect(&err);
		Error::DbError
	};
	let license_type: &str = row.try_get("license_type").map_err(get_err)?;
	let expiry_date: &str = row.try_get("expiry_date").map_err(get_err)?;
	let status: &str = row.try_get("status").map_err(get_err)?;

	Ok(LogEntry {
		log_id: row.try_get("log_id").map_err(get_err)?,
		applicant_id: ApplicantId(row.try_get("applicant_id").map_err(get_err)?),
		license_type: license_type.parse().map_err(|_| Error::DbError)?,
		expiry_date: NaiveDate::parse_from_str(expiry_date, DATE_FORMAT).map_err(|_| Error::DbError)?,
		recipient: row.try_get("recipient").map_err(get_err)?,
		status: status.parse().map_err(|_| Error::DbError)?,
		error: row.try_get("error").map_err(get_err)?,
		created_at: Timestamp(row.try_get("created_at").map_err(get_err)?),
	})
}

/// List log entries, newest first
pub(crate) async fn list(db: &SqlitePool, opts: &ListLogOptions) -> ClResult<Vec<LogEntry>> {
	let mut query = sqlx::QueryBuilder::new(
		"SELECT log_id, applicant_id, license_type, expiry_date, recipient, status, error, created_at
		FROM notification_log WHERE 1=1",
	);

	if let Some(status) = opts.status {
		query.push(" AND status = ").push_bind(status.as_str());
	}
	if let Some(created_after) = opts.created_after {
		query.push(" AND created_at >= ").push_bind(created_after.0);
	}

	query.push(" ORDER BY created_at DESC, log_id DESC");

	if let Some(limit) = opts.limit {
		query.push(" LIMIT ").push_bind(i64::from(limit));
	}

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	rows.iter().map(read_entry).collect()
}

// vim: ts=4
