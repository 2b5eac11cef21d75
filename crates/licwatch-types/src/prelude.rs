pub use crate::error::{ClResult, Error};
pub use crate::types::{ApplicantId, LicenseType, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
