//! Delivery dispatcher. Renders and sends one message per recipient group and
//! records the outcome of every item in it.

use licwatch_email::{MailTransport, NoticeRow, OutgoingEmail, TemplateRenderer};
use serde::Serialize;

use crate::audit;
use crate::config::SenderIdentity;
use crate::group::RecipientGroup;
use crate::prelude::*;
use licwatch_types::clock::Clock;
use licwatch_types::store_adapter::LogStatus;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
	pub sent: usize,
	pub failed: usize,
	pub skipped: usize,
}

pub struct Dispatcher<'a> {
	pub store: &'a dyn StoreAdapter,
	pub transport: &'a dyn MailTransport,
	pub renderer: &'a TemplateRenderer,
	pub clock: &'a dyn Clock,
	pub identity: &'a SenderIdentity,
}

pub fn notice_rows(group: &RecipientGroup) -> Vec<NoticeRow> {
	group
		.items
		.iter()
		.map(|item| NoticeRow {
			license: item.license_type.label().to_string(),
			expiry_date: item.expiry_date,
			days_until_expiry: item.days_until_expiry,
		})
		.collect()
}

impl Dispatcher<'_> {
	async fn deliver(&self, group: &RecipientGroup) -> ClResult<()> {
		let rendered = self.renderer.render(&self.identity.notes, &group.name, &notice_rows(group))?;
		let email = OutgoingEmail {
			from: self.identity.from.clone(),
			to: group.email.clone(),
			subject: rendered.subject,
			html: rendered.html,
		};
		self.transport.send(&email, &self.identity.credential).await
	}

	/// Send every group. A failure only affects the items of its own group.
	pub async fn dispatch(&self, groups: &[RecipientGroup]) -> RunSummary {
		let mut summary = RunSummary::default();

		for group in groups {
			let (status, error) = match self.deliver(group).await {
				Ok(()) => {
					info!("Sent expiry notice for {} item(s) to {}", group.items.len(), group.email);
					(LogStatus::Sent, None)
				}
				Err(err) => {
					warn!("Expiry notice to {} failed: {}", group.email, err);
					(LogStatus::Failed, Some(err.to_string()))
				}
			};

			let created_at = self.clock.timestamp();
			for item in &group.items {
				audit::record(self.store, item, Some(&group.email), status, error.as_deref(), created_at).await;
			}

			match status {
				LogStatus::Sent => summary.sent += group.items.len(),
				_ => summary.failed += group.items.len(),
			}
		}

		summary
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{FakeTransport, MemoryStore, clock_at, item_for};
	use licwatch_email::TemplateNotes;

	fn identity() -> SenderIdentity {
		SenderIdentity { from: "hr@example.com".into(), credential: "pw".into(), notes: TemplateNotes::Empty }
	}

	fn group(email: &str, ids: &[i64]) -> RecipientGroup {
		RecipientGroup {
			email: email.into(),
			name: "Ada".into(),
			items: ids.iter().map(|id| item_for(*id, LicenseType::Security, Some(email))).collect(),
		}
	}

	#[tokio::test]
	async fn test_transport_failure_marks_whole_group() {
		let store = MemoryStore::default();
		let transport = FakeTransport::default();
		transport.fail_for("a@x.com", "connection refused");
		let renderer = TemplateRenderer::new().unwrap();
		let clock = clock_at("2024-01-01T10:00:00+00:00");
		let identity = identity();
		let dispatcher =
			Dispatcher { store: &store, transport: &transport, renderer: &renderer, clock: &clock, identity: &identity };

		let summary = dispatcher.dispatch(&[group("a@x.com", &[1, 2, 3]), group("b@x.com", &[4])]).await;

		assert_eq!(summary, RunSummary { sent: 1, failed: 3, skipped: 0 });
		let logs = store.logs();
		let failed: Vec<_> = logs.iter().filter(|l| l.status == LogStatus::Failed).collect();
		assert_eq!(failed.len(), 3);
		assert!(failed.iter().all(|l| l.error == failed[0].error && l.error.is_some()));
		assert!(failed[0].error.as_deref().unwrap_or_default().contains("connection refused"));
		assert_eq!(logs.iter().filter(|l| l.status == LogStatus::Sent).count(), 1);

		// the healthy group was still delivered
		let sent = transport.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].to, "b@x.com");
		assert_eq!(sent[0].from, "hr@example.com");
		assert_eq!(sent[0].subject, "Expiring Licensure Warning (1)");
	}

	#[tokio::test]
	async fn test_one_message_per_group() {
		let store = MemoryStore::default();
		let transport = FakeTransport::default();
		let renderer = TemplateRenderer::new().unwrap();
		let clock = clock_at("2024-01-01T10:00:00+00:00");
		let identity = identity();
		let dispatcher =
			Dispatcher { store: &store, transport: &transport, renderer: &renderer, clock: &clock, identity: &identity };

		let summary = dispatcher.dispatch(&[group("a@x.com", &[1, 2])]).await;

		assert_eq!(summary.sent, 2);
		let sent = transport.sent();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].subject, "Expiring Licensure Warning (2)");
		assert_eq!(transport.credentials(), vec!["pw".to_string()]);
		assert!(store.logs().iter().all(|l| l.recipient.as_deref() == Some("a@x.com")));
	}

	#[tokio::test]
	async fn test_log_write_failure_keeps_status_and_continues() {
		let store = MemoryStore::default();
		store.fail_log_writes(true);
		let transport = FakeTransport::default();
		let renderer = TemplateRenderer::new().unwrap();
		let clock = clock_at("2024-01-01T10:00:00+00:00");
		let identity = identity();
		let dispatcher =
			Dispatcher { store: &store, transport: &transport, renderer: &renderer, clock: &clock, identity: &identity };

		let summary = dispatcher.dispatch(&[group("a@x.com", &[1, 2]), group("b@x.com", &[3])]).await;

		assert_eq!(summary, RunSummary { sent: 3, failed: 0, skipped: 0 });
		let sent: Vec<String> = transport.sent().into_iter().map(|e| e.to).collect();
		assert_eq!(sent, vec!["a@x.com".to_string(), "b@x.com".to_string()]);
		assert!(store.logs().is_empty());
	}
}

// vim: ts=4
