//! Audit logger. Write failures are reported as warnings and never change
//! the outcome of a run.

use crate::prelude::*;
use crate::scan::ExpiringItem;
use licwatch_types::store_adapter::{LogStatus, NewLogEntry};

pub async fn record(
	store: &dyn StoreAdapter,
	item: &ExpiringItem,
	recipient: Option<&str>,
	status: LogStatus,
	error: Option<&str>,
	created_at: Timestamp,
) {
	let entry = NewLogEntry {
		applicant_id: item.applicant_id,
		license_type: item.license_type,
		expiry_date: item.expiry_date,
		recipient: recipient.map(Into::into),
		status,
		error: error.map(Into::into),
		created_at,
	};

	if let Err(err) = store.create_log_entry(&entry).await {
		warn!(
			"Failed to write {} log entry for applicant {} ({}): {}",
			status.as_str(),
			item.applicant_id,
			item.license_type,
			err
		);
	}
}

// vim: ts=4
