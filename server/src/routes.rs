use axum::{
	Router,
	routing::{get, post},
};
use tower_http::trace::TraceLayer;

use licwatch_notify::{NotifyApp, handler};

pub fn init(app: NotifyApp) -> Router {
	let notify_router = Router::new()
		.route("/api/notify/preview", get(handler::get_preview))
		.route("/api/notify/log", get(handler::get_log))
		.route("/api/notify/run", post(handler::post_run))
		.route("/api/notify/test", post(handler::post_test))
		.route(
			"/api/notify/local-preferences",
			get(handler::get_local_preferences).put(handler::put_local_preferences),
		)
		.route("/api/notify/preferences", get(handler::get_preferences).put(handler::put_preferences))
		.route("/api/notify/sender", get(handler::get_sender).put(handler::put_sender));

	Router::new()
		.route("/health", get(async || "ok\n"))
		.merge(notify_router)
		.layer(TraceLayer::new_for_http())
		.with_state(app)
}


// vim: ts=4
