//! Recipient grouper

use std::collections::HashMap;

use crate::audit;
use crate::prelude::*;
use crate::scan::ExpiringItem;
use licwatch_types::clock::Clock;
use licwatch_types::store_adapter::LogStatus;

pub const MISSING_RECIPIENT: &str = "Missing recipient email";

/// All items addressed to one recipient
#[derive(Debug, Clone)]
pub struct RecipientGroup {
	pub email: String,
	/// Name of the first contact seen for this address
	pub name: String,
	pub items: Vec<ExpiringItem>,
}

#[derive(Debug, Default)]
pub struct Grouped {
	pub groups: Vec<RecipientGroup>,
	pub skipped: usize,
}

/// Group items by trimmed email in first-seen order. Items without an
/// address are logged as skipped right away and left out.
pub async fn group(store: &dyn StoreAdapter, clock: &dyn Clock, items: Vec<ExpiringItem>) -> Grouped {
	let mut grouped = Grouped::default();
	let mut index: HashMap<String, usize> = HashMap::new();

	for item in items {
		let Some(email) = item.recipient().map(str::to_string) else {
			debug!("Applicant {} has no email, skipping {} item", item.applicant_id, item.license_type);
			audit::record(store, &item, None, LogStatus::Skipped, Some(MISSING_RECIPIENT), clock.timestamp()).await;
			grouped.skipped += 1;
			continue;
		};

		if let Some(group) = index.get(&email).and_then(|pos| grouped.groups.get_mut(*pos)) {
			group.items.push(item);
		} else {
			index.insert(email.clone(), grouped.groups.len());
			grouped.groups.push(RecipientGroup { email, name: item.full_name(), items: vec![item] });
		}
	}

	grouped
}


// vim: ts=4
