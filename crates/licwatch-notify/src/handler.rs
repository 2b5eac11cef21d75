//! Notification HTTP handlers

use axum::{
	Json,
	extract::{Query, State},
	http::StatusCode,
};
use serde::Deserialize;

use crate::prelude::*;
use crate::{ExpiringItem, NotifyApp, RunReport, TestEmailReport};
use licwatch_types::store_adapter::{
	LocalPreferences, LogEntry, LogStatus, NotificationPreferences, SenderConfig,
};
use licwatch_types::types::ApiResponse;

type ApiResult<T> = ClResult<(StatusCode, Json<ApiResponse<T>>)>;

fn ok<T>(data: T) -> ApiResult<T> {
	Ok((StatusCode::OK, Json(ApiResponse::new(data))))
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
	pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogQuery {
	pub status: Option<String>,
	pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TestEmailRequest {
	pub to: Option<String>,
	pub subject: Option<String>,
}

/// GET /api/notify/preview
pub async fn get_preview(
	State(app): State<NotifyApp>,
	Query(query): Query<PreviewQuery>,
) -> ApiResult<Vec<ExpiringItem>> {
	ok(app.preview_expiring(query.limit).await?)
}

/// GET /api/notify/log
pub async fn get_log(State(app): State<NotifyApp>, Query(query): Query<LogQuery>) -> ApiResult<Vec<LogEntry>> {
	let status = query
		.status
		.as_deref()
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::parse::<LogStatus>)
		.transpose()?;
	ok(app.get_log(status, query.limit).await?)
}

/// POST /api/notify/run
///
/// Runs the pipeline immediately. Delivery failures are reported in the
/// summary; only configuration and store errors fail the request.
pub async fn post_run(State(app): State<NotifyApp>) -> ApiResult<RunReport> {
	ok(app.run_now().await?)
}

/// POST /api/notify/test
pub async fn post_test(
	State(app): State<NotifyApp>,
	Json(req): Json<TestEmailRequest>,
) -> ApiResult<TestEmailReport> {
	ok(app.send_test_email(req.to.as_deref(), req.subject.as_deref()).await?)
}

/// GET /api/notify/local-preferences
pub async fn get_local_preferences(State(app): State<NotifyApp>) -> ApiResult<LocalPreferences> {
	ok(app.load_local_preferences().await)
}

/// PUT /api/notify/local-preferences
pub async fn put_local_preferences(
	State(app): State<NotifyApp>,
	Json(prefs): Json<LocalPreferences>,
) -> ApiResult<LocalPreferences> {
	ok(app.save_local_preferences(&prefs).await?)
}

/// GET /api/notify/preferences
pub async fn get_preferences(State(app): State<NotifyApp>) -> ApiResult<NotificationPreferences> {
	ok(app.load_preferences().await?)
}

/// PUT /api/notify/preferences
pub async fn put_preferences(
	State(app): State<NotifyApp>,
	Json(prefs): Json<NotificationPreferences>,
) -> ApiResult<NotificationPreferences> {
	ok(app.save_preferences(&prefs).await?)
}

/// GET /api/notify/sender
pub async fn get_sender(State(app): State<NotifyApp>) -> ApiResult<Option<SenderConfig>> {
	ok(app.load_sender_config().await?)
}

/// PUT /api/notify/sender
///
/// The credential is accepted but never echoed back.
pub async fn put_sender(State(app): State<NotifyApp>, Json(cfg): Json<SenderConfig>) -> ApiResult<SenderConfig> {
	ok(app.save_sender_config(&cfg).await?)
}


// vim: ts=4
