//! Error type shared by all licwatch crates.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	NotFound,
	DbError,
	/// Invalid input on a write path (rejected before persistence)
	ValidationError(String),
	/// Missing or unusable configuration, aborts a whole run
	ConfigError(String),
	/// Mail transport failure
	ServiceUnavailable(String),
	Parse,
	Internal(String),

	// externals
	Io(std::io::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(_err: serde_json::Error) -> Self {
		Self::Parse
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::DbError => write!(f, "database error"),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::ConfigError(msg) => write!(f, "configuration error: {}", msg),
			Error::ServiceUnavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::Parse => write!(f, "parse error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = match &self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::ValidationError(_) | Error::Parse => StatusCode::BAD_REQUEST,
			Error::ConfigError(_) | Error::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			Error::DbError | Error::Internal(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};
		let body = serde_json::json!({ "error": { "code": status.as_u16(), "message": self.to_string() } });
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_display() {
		let err = Error::ConfigError("sender address is not configured".into());
		assert_eq!(err.to_string(), "configuration error: sender address is not configured");
		assert_eq!(Error::DbError.to_string(), "database error");
	}

	#[test]
	fn test_error_status_codes() {
		let res = Error::ValidationError("bad".into()).into_response();
		assert_eq!(res.status(), StatusCode::BAD_REQUEST);

		let res = Error::ConfigError("missing".into()).into_response();
		assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

		let res = Error::DbError.into_response();
		assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}

// vim: ts=4
