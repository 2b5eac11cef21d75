//! Contact resolver

use std::collections::{BTreeSet, HashMap};

use crate::prelude::*;
use crate::scan::ExpiringItem;
use licwatch_types::store_adapter::ContactRecord;

/// Maximum number of applicant ids per store lookup
pub const CONTACT_CHUNK_SIZE: usize = 500;

/// Attach contact fields to every item. Items whose applicant has no contact
/// record are dropped.
pub async fn resolve(store: &dyn StoreAdapter, items: Vec<ExpiringItem>) -> ClResult<Vec<ExpiringItem>> {
	let ids: Vec<ApplicantId> =
		items.iter().map(|item| item.applicant_id).collect::<BTreeSet<_>>().into_iter().collect();

	let mut contacts: HashMap<ApplicantId, ContactRecord> = HashMap::with_capacity(ids.len());
	for chunk in ids.chunks(CONTACT_CHUNK_SIZE) {
		for contact in store.list_contacts(chunk).await? {
			contacts.insert(contact.applicant_id, contact);
		}
	}

	let resolved: Vec<ExpiringItem> = items
		.into_iter()
		.filter_map(|mut item| match contacts.get(&item.applicant_id) {
			Some(contact) => {
				item.attach_contact(contact);
				Some(item)
			}
			None => {
				debug!("No contact for applicant {}, dropping {} item", item.applicant_id, item.license_type);
				None
			}
		})
		.collect();

	Ok(resolved)
}


// vim: ts=4
