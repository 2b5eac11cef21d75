//! Database schema initialization
//!
//! License and contact tables belong to the HR application; they are created
//! here only if missing so a standalone database works.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// License records
	//*****************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS licenses (
		applicant_id integer NOT NULL,
		security_expiration text,
		driver_expiration text,
		firearm_expiration text,
		PRIMARY KEY(applicant_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Contacts
	//**********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS contacts (
		applicant_id integer NOT NULL,
		first_name text,
		last_name text,
		email text,
		phone text,
		PRIMARY KEY(applicant_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Configuration rows
	//********************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS sender_config (
		provider text NOT NULL,
		sender_email text,
		credential text,
		active boolean NOT NULL DEFAULT 0,
		template_notes text,
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(provider)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS notification_prefs (
		pref_id integer NOT NULL,
		enabled boolean NOT NULL DEFAULT 0,
		days_before integer NOT NULL DEFAULT 30,
		include_security boolean NOT NULL DEFAULT 1,
		include_driver boolean NOT NULL DEFAULT 1,
		include_firearm boolean NOT NULL DEFAULT 1,
		send_time text NOT NULL DEFAULT '09:00',
		timezone text NOT NULL DEFAULT 'local',
		updated_at datetime DEFAULT (unixepoch()),
		PRIMARY KEY(pref_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Notification log
	//******************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS notification_log (
		log_id integer PRIMARY KEY AUTOINCREMENT,
		applicant_id integer NOT NULL,
		license_type text NOT NULL,
		expiry_date text NOT NULL,
		recipient text,
		status text NOT NULL,
		error text,
		created_at datetime NOT NULL DEFAULT (unixepoch())
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_notification_log_status_created ON notification_log(status, created_at)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_notification_log_item ON notification_log(applicant_id, license_type, expiry_date)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
