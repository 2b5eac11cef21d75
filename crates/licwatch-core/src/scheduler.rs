//! Daily scheduler gate. Polls once a minute and runs a job at most once per
//! local calendar day, after the configured send time.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use std::{
	fmt::Debug,
	sync::{Arc, Mutex},
	time::Duration,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::prelude::*;
use licwatch_types::clock::Clock;

pub const POLL_INTERVAL: Duration = Duration::from_secs(60);

/// A job triggered at most once per day
#[async_trait]
pub trait DailyJob: Send + Sync + Debug {
	/// Today's send time, or `None` while the job is switched off
	async fn schedule(&self) -> ClResult<Option<NaiveTime>>;
	async fn run(&self) -> ClResult<()>;
}

/// Remembers the local date of the last successful run
#[derive(Debug, Default, Clone)]
pub struct DailyGate {
	pub last_run: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
	Disabled,
	AlreadyRan,
	TooEarly,
	Ran,
	Failed,
}

type Worker = (CancellationToken, JoinHandle<()>);

pub struct DailyScheduler {
	job: Arc<dyn DailyJob>,
	clock: Arc<dyn Clock>,
	gate: tokio::sync::Mutex<DailyGate>,
	worker: Mutex<Option<Worker>>,
}

impl Debug for DailyScheduler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DailyScheduler").field("job", &self.job).finish_non_exhaustive()
	}
}

impl DailyScheduler {
	pub fn new(job: Arc<dyn DailyJob>, clock: Arc<dyn Clock>) -> Arc<Self> {
		Arc::new(Self {
			job,
			clock,
			gate: tokio::sync::Mutex::new(DailyGate::default()),
			worker: Mutex::new(None),
		})
	}

	pub async fn last_run(&self) -> Option<NaiveDate> {
		self.gate.lock().await.last_run
	}

	/// Evaluate the gate once and run the job if it is due.
	///
	/// The gate lock is held for the whole tick, so ticks never overlap.
	pub async fn tick(&self) -> TickOutcome {
		let mut gate = self.gate.lock().await;

		let send_time = match self.job.schedule().await {
			Ok(Some(send_time)) => send_time,
			Ok(None) => return TickOutcome::Disabled,
			Err(err) => {
				warn!("Daily job schedule unavailable: {}", err);
				return TickOutcome::Failed;
			}
		};

		let now = self.clock.now();
		let today = now.date_naive();
		if gate.last_run == Some(today) {
			return TickOutcome::AlreadyRan;
		}
		if now.time() < send_time {
			return TickOutcome::TooEarly;
		}

		info!("Running daily job for {} (send time {})", today, send_time.format("%H:%M"));
		match self.job.run().await {
			Ok(()) => {
				gate.last_run = Some(today);
				TickOutcome::Ran
			}
			Err(err) => {
				error!("Daily job failed, will retry on next poll: {}", err);
				TickOutcome::Failed
			}
		}
	}

	/// Spawn the polling loop. The first tick happens immediately.
	pub fn start(self: &Arc<Self>, cancel: CancellationToken) {
		let schedule = self.clone();
		let token = cancel.clone();

		let handle = tokio::spawn(async move {
			let mut interval = tokio::time::interval(POLL_INTERVAL);
			interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				tokio::select! {
					() = token.cancelled() => break,
					_ = interval.tick() => {
						let outcome = schedule.tick().await;
						debug!("Daily scheduler tick: {:?}", outcome);
					}
				}
			}
			info!("Daily scheduler stopped");
		});

		let mut worker = match self.worker.lock() {
			Ok(guard) => guard,
			Err(poisoned) => {
				error!("Mutex poisoned: worker (recovering)");
				poisoned.into_inner()
			}
		};
		if let Some((old_token, _)) = worker.replace((cancel, handle)) {
			warn!("Daily scheduler restarted, cancelling previous loop");
			old_token.cancel();
		}
	}

	/// Cancel the polling loop and wait for it to finish
	pub async fn stop(&self) {
		let worker = match self.worker.lock() {
			Ok(mut guard) => guard.take(),
			Err(poisoned) => poisoned.into_inner().take(),
		};

		if let Some((token, handle)) = worker {
			token.cancel();
			if let Err(err) = handle.await {
				warn!("Daily scheduler task ended abnormally: {}", err);
			}
		}
	}
}


// vim: ts=4
