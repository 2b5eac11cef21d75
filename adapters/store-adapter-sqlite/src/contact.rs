//! Contact records (read-only for the notification engine)

use sqlx::{Row, SqlitePool};

use licwatch::prelude::*;
use licwatch::store_adapter::ContactRecord;

use crate::{inspect, push_in};

/// Batched lookup by applicant id
pub(crate) async fn list(db: &SqlitePool, applicant_ids: &[ApplicantId]) -> ClResult<Vec<ContactRecord>> {
	if applicant_ids.is_empty() {
		return Ok(Vec::new());
	}

	let ids: Vec<i64> = applicant_ids.iter().map(|id| id.0).collect();
	let mut query = sqlx::QueryBuilder::new(
		"SELECT applicant_id, first_name, last_name, email, phone FROM contacts WHERE applicant_id IN ",
	);
	query = push_in(query, &ids);

	let rows = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	rows.iter()
		.map(|row| -> Result<ContactRecord, sqlx::Error> {
			Ok(ContactRecord {
				applicant_id: ApplicantId(row.try_get("applicant_id")?),
				first_name: row.try_get("first_name")?,
				last_name: row.try_get("last_name")?,
				email: row.try_get("email")?,
				phone: row.try_get("phone")?,
			})
		})
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

/// Insert or replace a contact
pub(crate) async fn upsert(db: &SqlitePool, contact: &ContactRecord) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO contacts (applicant_id, first_name, last_name, email, phone)
		VALUES (?, ?, ?, ?, ?)
		ON CONFLICT(applicant_id) DO UPDATE SET
			first_name = excluded.first_name,
			last_name = excluded.last_name,
			email = excluded.email,
			phone = excluded.phone",
	)
	.bind(contact.applicant_id.0)
	.bind(contact.first_name.as_deref())
	.bind(contact.last_name.as_deref())
	.bind(contact.email.as_deref())
	.bind(contact.phone.as_deref())
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

// vim: ts=4
