//! Expiry notice rendering with Handlebars
//!
//! The operator controls notices through the free-text notes on the sender
//! configuration. Notes holding a JSON object with `subject` and `bodyHtml`
//! are structured; anything else is a legacy plain message shown in a
//! bordered block. Every notice ends with the generated license table.

use chrono::NaiveDate;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::sanitize::{escape_html, sanitize_html};

pub const DEFAULT_SUBJECT: &str = "Expiring Licensure Warning ({count})";

const NOTICE_TEMPLATE_NAME: &str = "notice";

const NOTICE_TEMPLATE: &str = r#"<div style="font-family: Arial, Helvetica, sans-serif; color: #222;">
<p>{{#if name}}Hello {{name}},{{else}}Hello,{{/if}}</p>
{{#if body_html}}<div>{{{body_html}}}</div>
{{/if}}{{#if legacy_message}}<div style="border: 1px solid #d0d0d0; border-radius: 4px; padding: 12px; margin: 12px 0; white-space: pre-wrap;">{{legacy_message}}</div>
{{/if}}{{#unless body_html}}<p>The following license(s) on file are expiring soon or have recently expired. Please arrange a renewal and send us the updated document.</p>
{{/unless}}<table style="border-collapse: collapse; margin-top: 12px;" cellpadding="6">
<thead><tr><th align="left" style="border-bottom: 1px solid #999;">Type</th><th align="left" style="border-bottom: 1px solid #999;">Expiry Date</th><th align="left" style="border-bottom: 1px solid #999;">Days Remaining</th></tr></thead>
<tbody>
{{#each rows}}<tr><td>{{this.license}}</td><td>{{this.expiry_date}}</td><td>{{this.remaining}}</td></tr>
{{/each}}</tbody>
</table>
</div>
"#;

/// Parsed template notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateNotes {
	Structured { subject: Option<String>, body_html: Option<String> },
	Legacy(String),
	Empty,
}

#[derive(Deserialize)]
struct NotesDocument {
	#[serde(default)]
	subject: Option<String>,
	#[serde(default, rename = "bodyHtml", alias = "body_html")]
	body_html: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|s| !s.trim().is_empty())
}

impl TemplateNotes {
	pub fn parse(notes: Option<&str>) -> Self {
		let Some(notes) = notes.map(str::trim).filter(|s| !s.is_empty()) else {
			return TemplateNotes::Empty;
		};

		let doc = serde_json::from_str::<serde_json::Value>(notes)
			.ok()
			.filter(serde_json::Value::is_object)
			.and_then(|value| serde_json::from_value::<NotesDocument>(value).ok());

		match doc {
			Some(doc) => TemplateNotes::Structured {
				subject: non_empty(doc.subject),
				body_html: non_empty(doc.body_html),
			},
			None => {
				debug!("Template notes are not structured, using legacy message");
				TemplateNotes::Legacy(notes.to_string())
			}
		}
	}

	fn subject(&self) -> Option<&str> {
		match self {
			TemplateNotes::Structured { subject, .. } => subject.as_deref(),
			_ => None,
		}
	}
}

/// One line of the generated license table
#[derive(Debug, Clone)]
pub struct NoticeRow {
	pub license: String,
	pub expiry_date: NaiveDate,
	pub days_until_expiry: i64,
}

#[derive(Serialize)]
struct RowVars {
	license: String,
	expiry_date: String,
	remaining: String,
}

#[derive(Serialize)]
struct NoticeVars {
	name: String,
	body_html: String,
	legacy_message: String,
	rows: Vec<RowVars>,
}

#[derive(Debug, Clone)]
pub struct RenderedEmail {
	pub subject: String,
	pub html: String,
}

/// Human readable remaining time for the table
pub fn remaining_text(days: i64) -> String {
	match days {
		d if d < 0 => format!("Expired {} day(s) ago", d.unsigned_abs()),
		0 => "Expires today".to_string(),
		d => format!("{} day(s)", d),
	}
}

/// Subject line with `{count}` substituted. Header injection is prevented by
/// dropping line breaks.
pub fn render_subject(template: Option<&str>, count: usize) -> String {
	template
		.unwrap_or(DEFAULT_SUBJECT)
		.replace("{count}", &count.to_string())
		.replace(['\r', '\n'], " ")
		.trim()
		.to_string()
}

/// Template engine for expiry notices
pub struct TemplateRenderer {
	handlebars: Handlebars<'static>,
}

impl TemplateRenderer {
	pub fn new() -> ClResult<Self> {
		let mut handlebars = Handlebars::new();

		// Enable strict mode to catch undefined variables
		handlebars.set_strict_mode(true);
		handlebars.register_escape_fn(escape_html);
		handlebars.register_template_string(NOTICE_TEMPLATE_NAME, NOTICE_TEMPLATE).map_err(|e| {
			Error::Internal(format!("Failed to register notice template: {}", e))
		})?;

		Ok(Self { handlebars })
	}

	/// Render the notice for one recipient
	pub fn render(
		&self,
		notes: &TemplateNotes,
		recipient_name: &str,
		rows: &[NoticeRow],
	) -> ClResult<RenderedEmail> {
		let subject = render_subject(notes.subject(), rows.len());

		let (body_html, legacy_message) = match notes {
			TemplateNotes::Structured { body_html: Some(body), .. } => (sanitize_html(body)?, String::new()),
			TemplateNotes::Legacy(text) => (String::new(), text.clone()),
			TemplateNotes::Structured { body_html: None, .. } | TemplateNotes::Empty => {
				(String::new(), String::new())
			}
		};

		let vars = NoticeVars {
			name: recipient_name.trim().to_string(),
			body_html,
			legacy_message,
			rows: rows
				.iter()
				.map(|row| RowVars {
					license: row.license.clone(),
					expiry_date: row.expiry_date.format("%Y-%m-%d").to_string(),
					remaining: remaining_text(row.days_until_expiry),
				})
				.collect(),
		};

		let html = self.handlebars.render(NOTICE_TEMPLATE_NAME, &vars).map_err(|e| {
			Error::Internal(format!("Failed to render notice: {}", e))
		})?;

		Ok(RenderedEmail { subject, html })
	}
}


// vim: ts=4
