//! Operator HTML sanitizer
//!
//! A deterministic text transform over the `bodyHtml` template field. It
//! removes a fixed set of active elements, inline event handlers and
//! `javascript:` links. It is not an HTML parser: malformed or nested markup
//! is handled only as far as the patterns reach.

use regex::Regex;
use std::sync::LazyLock;

use crate::prelude::*;

/// Elements dropped together with their content
const BLOCKED_TAGS: [&str; 5] = ["script", "style", "iframe", "object", "embed"];

struct Patterns {
	self_closing: Regex,
	elements: Vec<Regex>,
	/// Any open/close tag left without a partner
	stray_tags: Regex,
	event_handlers: Regex,
	javascript_urls: Regex,
}

impl Patterns {
	fn compile() -> Result<Self, regex::Error> {
		Ok(Self {
			self_closing: Regex::new(r"(?i)<(?:script|style|iframe|object|embed)\b[^>]*/\s*>")?,
			elements: BLOCKED_TAGS
				.iter()
				.map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")))
				.collect::<Result<_, _>>()?,
			stray_tags: Regex::new(r"(?i)</?(?:script|style|iframe|object|embed)\b[^>]*>")?,
			event_handlers: Regex::new(r#"(?i)([\s/])on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*')"#)?,
			javascript_urls: Regex::new(
				r#"(?i)\b(href|src)\s*=\s*(?:"\s*javascript:[^"]*"|'\s*javascript:[^']*'|javascript:[^\s>]*)"#,
			)?,
		})
	}
}

static PATTERNS: LazyLock<Result<Patterns, regex::Error>> = LazyLock::new(Patterns::compile);

/// Sanitize operator supplied markup before it is embedded in a notice
pub fn sanitize_html(html: &str) -> ClResult<String> {
	let patterns = PATTERNS
		.as_ref()
		.map_err(|e| Error::Internal(format!("sanitizer patterns failed to compile: {}", e)))?;

	let mut out = patterns.self_closing.replace_all(html, "").into_owned();
	for re in &patterns.elements {
		out = re.replace_all(&out, "").into_owned();
	}
	out = patterns.stray_tags.replace_all(&out, "").into_owned();
	// keep a separating space so `<img/onerror=..>` stays a valid tag
	out = patterns
		.event_handlers
		.replace_all(&out, |caps: &regex::Captures| if &caps[1] == "/" { " ".to_string() } else { String::new() })
		.into_owned();
	out = patterns.javascript_urls.replace_all(&out, "${1}=\"#\"").into_owned();

	Ok(out)
}

/// Escape text for HTML interpolation (`& < > " '`)
pub fn escape_html(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#39;"),
			c => out.push(c),
		}
	}
	out
}


// vim: ts=4
