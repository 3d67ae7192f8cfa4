//! Main entry point for the fixline service.
//!
//! This binary wires the lifecycle engine to its storage backend, push
//! transport and HTTP API. All concrete implementations are selected by
//! name from the configuration file, so the same binary runs against an
//! in-memory backend in development and a file backend in production.

use clap::Parser;
use fixline_config::Config;
use fixline_core::{
	Directory, Dispatcher, EquipmentRegistry, EventBus, LifecycleEngine, NotificationStore,
	OrderRepository,
};
use fixline_push::{create_transport, PushService};
use fixline_storage::{create_backend, StorageService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod apis;
mod server;

/// Command-line arguments for the fixline service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the fixline service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the lifecycle engine with its implementations
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.init();

	tracing::info!("Started fixline service");

	let config = Config::from_file(args.config.to_str().unwrap())?;
	tracing::info!(
		storage = %config.storage.backend,
		push = %config.push.backend,
		"Loaded configuration"
	);

	let engine = Arc::new(build_engine(&config)?);

	// Lifecycle audit trail: every committed event lands in the logs.
	let mut events = engine.event_bus().subscribe();
	tokio::spawn(async move {
		while let Ok(event) = events.recv().await {
			tracing::debug!(
				order_id = %event.order().id,
				status = %event.status(),
				"Lifecycle event"
			);
		}
	});

	server::start_server(config.api.clone(), engine).await?;

	tracing::info!("Stopped fixline service");
	Ok(())
}

/// Builds the lifecycle engine from configuration.
///
/// Storage and push implementations are looked up by their configured
/// name; the config has already validated that a matching implementation
/// table exists.
fn build_engine(config: &Config) -> Result<LifecycleEngine, Box<dyn std::error::Error>> {
	let backend_name = config.storage.backend.as_str();
	let backend_config = config
		.storage
		.implementations
		.get(backend_name)
		.ok_or_else(|| format!("no configuration for storage backend '{}'", backend_name))?;
	let storage = Arc::new(StorageService::new(create_backend(
		backend_name,
		backend_config,
	)?));

	let transport_name = config.push.backend.as_str();
	let transport_config = config
		.push
		.implementations
		.get(transport_name)
		.ok_or_else(|| format!("no configuration for push transport '{}'", transport_name))?;
	let push = Arc::new(PushService::new(
		create_transport(transport_name, transport_config)?,
		Duration::from_millis(config.push.timeout_ms),
	));

	let orders = Arc::new(OrderRepository::new(storage.clone()));
	let notifications = Arc::new(NotificationStore::new(storage.clone()));
	let directory = Arc::new(Directory::new(storage.clone()));
	let equipment = Arc::new(EquipmentRegistry::new(storage.clone()));
	let dispatcher = Arc::new(Dispatcher::new(
		notifications.clone(),
		directory.clone(),
		push,
	));

	Ok(LifecycleEngine::new(
		orders,
		notifications,
		directory,
		equipment,
		dispatcher,
		EventBus::new(1000),
		config.reports.revenue_lookback_months,
	))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn minimal_config() -> Config {
		Config::from_str(
			r#"
[storage]
backend = "memory"
[storage.implementations.memory]
"#,
		)
		.unwrap()
	}

	#[test]
	fn test_args_default_values() {
		let args = Args {
			config: PathBuf::from("config.toml"),
			log_level: "info".to_string(),
		};

		assert_eq!(args.config, PathBuf::from("config.toml"));
		assert_eq!(args.log_level, "info");
	}

	#[test]
	fn test_build_engine_with_minimal_config() {
		let config = minimal_config();
		let engine = build_engine(&config);
		assert!(engine.is_ok(), "failed to build engine: {:?}", engine.err());
	}

	#[test]
	fn test_build_engine_rejects_missing_backend_table() {
		let mut config = minimal_config();
		config.storage.backend = "file".to_string();

		let result = build_engine(&config);
		assert!(result.is_err());
	}

	#[test]
	fn test_build_engine_with_file_backend() {
		let dir = tempfile::tempdir().unwrap();
		let config = Config::from_str(&format!(
			r#"
[storage]
backend = "file"
[storage.implementations.file]
path = "{}"
"#,
			dir.path().join("data").display()
		))
		.unwrap();

		let engine = build_engine(&config);
		assert!(engine.is_ok(), "failed to build engine: {:?}", engine.err());
	}
}
