//! Configuration loader. Reads everything a run needs, with no side effects.

use licwatch_core::local_prefs::LocalPrefsStore;
use licwatch_email::TemplateNotes;

use crate::prelude::*;
use licwatch_types::store_adapter::{LocalPreferences, NotificationPreferences, SenderConfig};

#[derive(Debug, Clone)]
pub struct RunConfig {
	/// Active sender config of the configured provider
	pub sender: Option<SenderConfig>,
	pub prefs: NotificationPreferences,
	pub local: LocalPreferences,
}

/// Outbound identity required to dispatch anything
#[derive(Debug, Clone)]
pub struct SenderIdentity {
	pub from: String,
	pub credential: String,
	pub notes: TemplateNotes,
}

impl RunConfig {
	pub fn sender_identity(&self) -> ClResult<SenderIdentity> {
		let sender = self
			.sender
			.as_ref()
			.filter(|sender| sender.active)
			.ok_or_else(|| Error::ConfigError("No active sender configuration".into()))?;
		let from = sender
			.sender_email()
			.ok_or_else(|| Error::ConfigError("Sender email address is not configured".into()))?;
		let credential = sender
			.credential()
			.ok_or_else(|| Error::ConfigError("Sender credential is not configured".into()))?;

		Ok(SenderIdentity {
			from: from.to_string(),
			credential: credential.to_string(),
			notes: TemplateNotes::parse(sender.template_notes.as_deref()),
		})
	}
}

pub async fn load_preferences(store: &dyn StoreAdapter) -> ClResult<NotificationPreferences> {
	Ok(store.read_notification_prefs().await?.unwrap_or_default())
}

pub async fn load(
	store: &dyn StoreAdapter,
	local_prefs: &dyn LocalPrefsStore,
	provider: &str,
) -> ClResult<RunConfig> {
	let sender = store.read_sender_config(provider).await?;
	let prefs = load_preferences(store).await?;
	let local = local_prefs.load().await;

	Ok(RunConfig { sender, prefs, local })
}


// vim: ts=4
