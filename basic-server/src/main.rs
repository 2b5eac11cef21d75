use std::sync::Arc;

use licwatch_core::EncryptedFilePrefs;
use licwatch_email::SmtpMailer;
use licwatch_server::{AppBuilder, ServerConfig};
use licwatch_store_adapter_sqlite::StoreAdapterSqlite;
use tracing::error;

#[tokio::main]
async fn main() -> std::process::ExitCode {
	let mut builder = AppBuilder::new();

	let config = match ServerConfig::from_env() {
		Ok(config) => config,
		Err(err) => {
			error!("FATAL: {}", err);
			return std::process::ExitCode::FAILURE;
		}
	};

	let store = match StoreAdapterSqlite::new(&config.db_path).await {
		Ok(store) => store,
		Err(err) => {
			error!("FATAL: Cannot open store {}: {}", config.db_path.display(), err);
			return std::process::ExitCode::FAILURE;
		}
	};

	builder
		.listen(config.listen.clone())
		.provider(config.provider.clone())
		.store(Arc::new(store))
		.local_prefs(Arc::new(EncryptedFilePrefs::new(&config.local_prefs_path, &config.local_prefs_secret)))
		.transport(Arc::new(SmtpMailer::new(config.smtp.clone())));

	if let Err(err) = builder.run().await {
		error!("FATAL: {}", err);
		return std::process::ExitCode::FAILURE;
	}
	std::process::ExitCode::SUCCESS
}

// vim: ts=4
