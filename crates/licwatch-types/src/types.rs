//! Common types used throughout licwatch.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::prelude::*;

// ApplicantId //
//*************//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub i64);

impl std::fmt::Display for ApplicantId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Timestamp //
//***********//
/// Unix timestamp in seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

pub fn now() -> Timestamp {
	let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
	Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
}

// LicenseType //
//*************//
/// License kinds tracked on a license record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseType {
	Security,
	Driver,
	Firearm,
}

impl LicenseType {
	pub const ALL: [LicenseType; 3] = [LicenseType::Security, LicenseType::Driver, LicenseType::Firearm];

	/// Stable identifier used in the store and in log entries
	pub fn as_str(&self) -> &'static str {
		match self {
			LicenseType::Security => "security",
			LicenseType::Driver => "driver",
			LicenseType::Firearm => "firearm",
		}
	}

	/// Human readable name used in outgoing mail
	pub fn label(&self) -> &'static str {
		match self {
			LicenseType::Security => "Security License",
			LicenseType::Driver => "Driver License",
			LicenseType::Firearm => "Firearm Permit",
		}
	}
}

impl std::fmt::Display for LicenseType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for LicenseType {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"security" => Ok(LicenseType::Security),
			"driver" => Ok(LicenseType::Driver),
			"firearm" => Ok(LicenseType::Firearm),
			_ => Err(Error::ValidationError(format!("unknown license type: {}", s))),
		}
	}
}

// ApiResponse //
//*************//
/// Envelope for every JSON response of the invocation surface
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
	pub data: T,
	pub time: Timestamp,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, time: now() }
	}
}


// vim: ts=4
