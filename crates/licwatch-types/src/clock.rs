//! Wall clock abstraction
//!
//! Every calendar decision (scanner offsets, dedup day boundary, scheduler
//! gate) goes through a `Clock`, so they all agree on what "today" is.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Timelike};
use std::sync::RwLock;

use crate::types::Timestamp;

pub trait Clock: Send + Sync {
	/// Current local time including its UTC offset
	fn now(&self) -> DateTime<FixedOffset>;

	fn timestamp(&self) -> Timestamp {
		Timestamp(self.now().timestamp())
	}

	fn today(&self) -> NaiveDate {
		self.now().date_naive()
	}

	/// Timestamp of local midnight of the current day
	fn day_start(&self) -> Timestamp {
		local_day_start(&self.now())
	}
}

/// Unix timestamp of the local midnight that starts the day of `now`
pub fn local_day_start(now: &DateTime<FixedOffset>) -> Timestamp {
	let midnight = now.date_naive().and_time(NaiveTime::MIN);
	let secs = midnight
		.and_local_timezone(*now.offset())
		.single()
		.map_or_else(|| now.timestamp() - i64::from(now.time().num_seconds_from_midnight()), |dt| dt.timestamp());
	Timestamp(secs)
}

/// Unix timestamp of the first instant of `date` in `tz`.
///
/// Unlike `local_day_start` this uses the offset in force at midnight, which
/// differs from the current one on DST change days. Where midnight itself is
/// skipped, the day starts at the first valid local time after the gap.
pub fn zone_day_start<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<Timestamp> {
	let midnight = date.and_time(NaiveTime::MIN);
	tz.from_local_datetime(&midnight)
		.earliest()
		.or_else(|| tz.from_local_datetime(&(midnight + TimeDelta::hours(1))).earliest())
		.map(|dt| Timestamp(dt.timestamp()))
}

/// Process-local system clock
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<FixedOffset> {
		Local::now().fixed_offset()
	}

	fn day_start(&self) -> Timestamp {
		let now = self.now();
		zone_day_start(&Local, now.date_naive()).unwrap_or_else(|| local_day_start(&now))
	}
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
	now: RwLock<DateTime<FixedOffset>>,
}

impl ManualClock {
	pub fn new(now: DateTime<FixedOffset>) -> Self {
		Self { now: RwLock::new(now) }
	}

	pub fn set(&self, now: DateTime<FixedOffset>) {
		if let Ok(mut guard) = self.now.write() {
			*guard = now;
		}
	}
}

impl Clock for ManualClock {
	fn now(&self) -> DateTime<FixedOffset> {
		match self.now.read() {
			Ok(guard) => *guard,
			Err(poisoned) => *poisoned.into_inner(),
		}
	}
}


// vim: ts=4
