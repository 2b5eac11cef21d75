//! Single-row configuration: sender identity and notification preferences

use sqlx::{Row, SqlitePool};

use licwatch::prelude::*;
use licwatch::store_adapter::{NotificationPreferences, SenderConfig};

use crate::inspect;

/// Id of the shared preferences row
const PREFS_ROW: i64 = 1;

/// Read the sender row of a provider, optionally only when it is active
pub(crate) async fn read_sender(
	db: &SqlitePool,
	provider: &str,
	active_only: bool,
) -> ClResult<Option<SenderConfig>> {
	let mut query = sqlx::QueryBuilder::new(
		"SELECT provider, sender_email, credential, active, template_notes, updated_at
		FROM sender_config WHERE provider = ",
	);
	query.push_bind(provider);
	if active_only {
		query.push(" AND active");
	}
	query.push(" ORDER BY updated_at DESC LIMIT 1");

	let row = query
		.build()
		.fetch_optional(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let Some(row) = row else {
		return Ok(None);
	};

	let res = (|| -> Result<SenderConfig, sqlx::Error> {
		Ok(SenderConfig {
			provider: row.try_get("provider")?,
			sender_email: row.try_get("sender_email")?,
			credential: row.try_get("credential")?,
			active: row.try_get("active")?,
			template_notes: row.try_get("template_notes")?,
			updated_at: Timestamp(row.try_get("updated_at")?),
		})
	})();

	res.map(Some).inspect_err(inspect).map_err(|_| Error::DbError)
}

/// Upsert the sender row. A missing credential keeps the stored one.
pub(crate) async fn upsert_sender(db: &SqlitePool, config: &SenderConfig) -> ClResult<()> {
	sqlx::query(
		"INSERT INTO sender_config (provider, sender_email, credential, active, template_notes, updated_at)
		VALUES (?, ?, ?, ?, ?, ?)
		ON CONFLICT(provider) DO UPDATE SET
			sender_email = excluded.sender_email,
			credential = coalesce(excluded.credential, sender_config.credential),
			active = excluded.active,
			template_notes = excluded.template_notes,
			updated_at = excluded.updated_at",
	)
	.bind(config.provider.as_ref())
	.bind(config.sender_email.as_deref())
	.bind(config.credential.as_deref())
	.bind(config.active)
	.bind(config.template_notes.as_deref())
	.bind(config.updated_at.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

pub(crate) async fn read_prefs(db: &SqlitePool) -> ClResult<Option<NotificationPreferences>> {
	let row = sqlx::query(
		"SELECT enabled, days_before, include_security, include_driver, include_firearm,
			send_time, timezone, updated_at
		FROM notification_prefs ORDER BY updated_at DESC LIMIT 1",
	)
	.fetch_optional(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	let Some(row) = row else {
		return Ok(None);
	};

	let res = (|| -> Result<NotificationPreferences, sqlx::Error> {
		Ok(NotificationPreferences {
			enabled: row.try_get("enabled")?,
			days_before: row.try_get("days_before")?,
			include_security: row.try_get("include_security")?,
			include_driver: row.try_get("include_driver")?,
			include_firearm: row.try_get("include_firearm")?,
			send_time: row.try_get("send_time")?,
			timezone: row.try_get("timezone")?,
			updated_at: Timestamp(row.try_get("updated_at")?),
		})
	})();

	res.map(Some).inspect_err(inspect).map_err(|_| Error::DbError)
}

pub(crate) async fn upsert_prefs(db: &SqlitePool, prefs: &NotificationPreferences) -> ClResult<()> {
	sqlx::query(
		"INSERT OR REPLACE INTO notification_prefs (pref_id, enabled, days_before, include_security,
			include_driver, include_firearm, send_time, timezone, updated_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
	)
	.bind(PREFS_ROW)
	.bind(prefs.enabled)
	.bind(prefs.days_before)
	.bind(prefs.include_security)
	.bind(prefs.include_driver)
	.bind(prefs.include_firearm)
	.bind(prefs.send_time.as_ref())
	.bind(prefs.timezone.as_ref())
	.bind(prefs.updated_at.0)
	.execute(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	Ok(())
}

// vim: ts=4
