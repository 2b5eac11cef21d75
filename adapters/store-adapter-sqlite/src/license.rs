//! License records (read-only for the notification engine)

use sqlx::{Row, SqlitePool};

use licwatch::prelude::*;
use licwatch::store_adapter::LicenseRecord;

use crate::inspect;

pub(crate) async fn list(db: &SqlitePool) -> ClResult<Vec<LicenseRecord>> {
	let rows = sqlx::query(
		"SELECT applicant_id, security_expiration, driver_expiration, firearm_expiration
		FROM licenses ORDER BY applicant_id",
	)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	rows.iter()
		.map(|row| -> Result<LicenseRecord, sqlx::Error> {
			Ok(LicenseRecord {
				applicant_id: ApplicantId(row.try_get("applicant_id")?),
				security_expiration: row.try_get("security_expiration")?,
				driver_expiration: row.try_get("driver_expiration")?,
				firearm_expiration: row.try_get("firearm_expiration")?,
			})
		})
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

/// Insert or replace a license record
pub(crate) async fn upsert(db: &SqlitePool, record: &LicenseRecord) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO licenses (applicant_id, security_expiration, driver_expiration, firearm_expiration)
		VALUES (?, ?, ?, ?)
		ON CONFLICT(applicant_id) DO UPDATE SET
			security_expiration = excluded.security_expiration,
			driver_expiration = excluded.driver_expiration,
			firearm_expiration = excluded.firearm_expiration",
	)
	.bind(record.applicant_id.0)
	.bind(record.security_expiration.as_deref())
	.bind(record.driver_expiration.as_deref())
	.bind(record.firearm_expiration.as_deref())
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

// vim: ts=4
