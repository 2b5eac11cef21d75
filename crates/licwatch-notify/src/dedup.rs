//! Dedup gate. Drops items already sent since local midnight.

use std::collections::HashSet;

use crate::prelude::*;
use crate::scan::ExpiringItem;
use licwatch_types::clock::Clock;
use licwatch_types::store_adapter::{ListLogOptions, LogStatus};

pub async fn filter_already_sent(
	store: &dyn StoreAdapter,
	clock: &dyn Clock,
	items: Vec<ExpiringItem>,
) -> ClResult<Vec<ExpiringItem>> {
	if items.is_empty() {
		return Ok(items);
	}

	let opts = ListLogOptions {
		status: Some(LogStatus::Sent),
		created_after: Some(clock.day_start()),
		limit: None,
	};
	let sent: HashSet<_> = store
		.list_log_entries(&opts)
		.await?
		.into_iter()
		.map(|entry| (entry.applicant_id, entry.license_type, entry.expiry_date))
		.collect();

	let before = items.len();
	let items: Vec<ExpiringItem> = items.into_iter().filter(|item| !sent.contains(&item.dedup_key())).collect();
	if items.len() < before {
		info!("Dedup gate suppressed {} item(s) already sent today", before - items.len());
	}

	Ok(items)
}


// vim: ts=4
