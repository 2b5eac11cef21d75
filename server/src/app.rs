//! App builder - constructs and runs the licwatch server

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use licwatch_core::{DailyScheduler, LocalPrefsStore};
use licwatch_email::MailTransport;
use licwatch_notify::NotifyModule;
use licwatch_types::clock::{Clock, SystemClock};
use licwatch_types::store_adapter::StoreAdapter;

use crate::prelude::*;
use crate::routes;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppBuilder {
	listen: Box<str>,
	provider: Box<str>,
	store: Option<Arc<dyn StoreAdapter>>,
	local_prefs: Option<Arc<dyn LocalPrefsStore>>,
	transport: Option<Arc<dyn MailTransport>>,
	clock: Arc<dyn Clock>,
}

impl AppBuilder {
	pub fn new() -> Self {
		tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.init();
		AppBuilder {
			listen: "127.0.0.1:8080".into(),
			provider: "smtp".into(),
			store: None,
			local_prefs: None,
			transport: None,
			clock: Arc::new(SystemClock),
		}
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.listen = listen.into();
		self
	}

	pub fn provider(&mut self, provider: impl Into<Box<str>>) -> &mut Self {
		self.provider = provider.into();
		self
	}

	// Adapters
	pub fn store(&mut self, store: Arc<dyn StoreAdapter>) -> &mut Self {
		self.store = Some(store);
		self
	}

	pub fn local_prefs(&mut self, local_prefs: Arc<dyn LocalPrefsStore>) -> &mut Self {
		self.local_prefs = Some(local_prefs);
		self
	}

	pub fn transport(&mut self, transport: Arc<dyn MailTransport>) -> &mut Self {
		self.transport = Some(transport);
		self
	}

	pub fn clock(&mut self, clock: Arc<dyn Clock>) -> &mut Self {
		self.clock = clock;
		self
	}

	pub async fn run(self) -> ClResult<()> {
		info!("licwatch V{}", VERSION);

		let Some(store) = self.store else {
			error!("FATAL: No store adapter configured");
			return Err(Error::Internal("No store adapter configured".to_string()));
		};
		let Some(local_prefs) = self.local_prefs else {
			error!("FATAL: No local preferences store configured");
			return Err(Error::Internal("No local preferences store configured".to_string()));
		};
		let Some(transport) = self.transport else {
			error!("FATAL: No mail transport configured");
			return Err(Error::Internal("No mail transport configured".to_string()));
		};

		let module = Arc::new(NotifyModule::new(
			store,
			local_prefs,
			transport,
			self.clock.clone(),
			&self.provider,
		)?);

		let cancel = CancellationToken::new();
		let scheduler = DailyScheduler::new(module.clone(), self.clock);
		scheduler.start(cancel.clone());
		info!("Daily scheduler started");

		let router = routes::init(module);
		let listener = tokio::net::TcpListener::bind(&*self.listen).await.map_err(|e| {
			error!("FATAL: Cannot listen on {}: {}", self.listen, e);
			Error::Io(e)
		})?;
		info!("Listening on http://{}", self.listen);

		let shutdown = cancel.clone();
		let served = axum::serve(listener, router)
			.with_graceful_shutdown(async move {
				tokio::select! {
					() = shutdown_signal() => info!("Shutdown requested"),
					() = shutdown.cancelled() => {}
				}
			})
			.await;

		cancel.cancel();
		scheduler.stop().await;
		info!("Server stopped");

		served.map_err(Error::Io)
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		error!("Cannot listen for shutdown signal: {}", err);
		std::future::pending::<()>().await;
	}
}

// vim: ts=4
