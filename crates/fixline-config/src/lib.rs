//! Configuration module for the service order system.
//!
//! This module provides structures and utilities for managing service
//! configuration. It supports loading configuration from TOML files,
//! resolving environment variable references, and validating that all
//! required configuration values are properly set.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the service.
///
/// This structure contains all configuration sections required for the
/// service to operate: the storage backend, the push transport, the HTTP
/// API server, and reporting parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Configuration for the storage backend.
	pub storage: StorageConfig,
	/// Configuration for push delivery.
	#[serde(default)]
	pub push: PushConfig,
	/// Configuration for the HTTP API server.
	#[serde(default)]
	pub api: ApiConfig,
	/// Configuration for report generation.
	#[serde(default)]
	pub reports: ReportsConfig,
}

/// Configuration for the storage backend.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	/// Which implementation to use as backend.
	pub backend: String,
	/// Map of storage implementation names to their configurations.
	/// Each implementation has its own configuration format stored as raw TOML values.
	pub implementations: HashMap<String, toml::Value>,
}

/// Configuration for push delivery.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PushConfig {
	/// Which implementation to use as backend.
	#[serde(default = "default_push_backend")]
	pub backend: String,
	/// Timeout in milliseconds applied to every push send.
	/// Defaults to 3000 milliseconds if not specified.
	#[serde(default = "default_push_timeout_ms")]
	pub timeout_ms: u64,
	/// Map of push implementation names to their configurations.
	#[serde(default = "default_push_implementations")]
	pub implementations: HashMap<String, toml::Value>,
}

impl Default for PushConfig {
	fn default() -> Self {
		Self {
			backend: default_push_backend(),
			timeout_ms: default_push_timeout_ms(),
			implementations: default_push_implementations(),
		}
	}
}

/// Returns the default push backend name.
///
/// This selects the log transport, which delivers nothing and only
/// records messages, when no explicit backend is configured.
fn default_push_backend() -> String {
	"log".to_string()
}

/// Returns the default push timeout in milliseconds.
///
/// This provides a default bound of 3000 milliseconds per send
/// when no explicit timeout is configured.
fn default_push_timeout_ms() -> u64 {
	3000
}

/// Returns the default push implementations map.
///
/// The log transport needs no parameters, so its entry is an empty table.
fn default_push_implementations() -> HashMap<String, toml::Value> {
	let mut implementations = HashMap::new();
	implementations.insert("log".to_string(), toml::Value::Table(Default::default()));
	implementations
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Host address to bind the server to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind the server to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

impl Default for ApiConfig {
	fn default() -> Self {
		Self {
			host: default_api_host(),
			port: default_api_port(),
		}
	}
}

/// Returns the default API host.
///
/// This provides a default host address of 127.0.0.1 (localhost) for the API server
/// when no explicit host is configured.
fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

/// Returns the default API port.
///
/// This provides a default port of 3000 for the API server
/// when no explicit port is configured.
fn default_api_port() -> u16 {
	3000
}

/// Configuration for report generation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReportsConfig {
	/// Number of months covered by the monthly revenue series.
	/// Defaults to 3 months if not specified.
	#[serde(default = "default_revenue_lookback_months")]
	pub revenue_lookback_months: u32,
}

impl Default for ReportsConfig {
	fn default() -> Self {
		Self {
			revenue_lookback_months: default_revenue_lookback_months(),
		}
	}
}

/// Returns the default revenue lookback window in months.
///
/// This provides a default window of 3 months for the monthly revenue
/// series when no explicit window is configured.
fn default_revenue_lookback_months() -> u32 {
	3
}

/// Resolves environment variables in a string.
///
/// Replaces ${VAR_NAME} with the value of the environment variable VAR_NAME.
/// Supports default values with ${VAR_NAME:-default_value}.
///
/// Input strings are limited to 1MB to prevent ReDoS attacks.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	// Limit input size to prevent ReDoS attacks
	const MAX_INPUT_SIZE: usize = 1024 * 1024; // 1MB
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut result = input.to_string();
	let mut replacements = Vec::new();

	for cap in re.captures_iter(input) {
		let full_match = cap.get(0).unwrap();
		let var_name = cap.get(1).unwrap().as_str();
		let default_value = cap.get(2).map(|m| m.as_str());

		let value = match std::env::var(var_name) {
			Ok(v) => v,
			Err(_) => {
				if let Some(default) = default_value {
					default.to_string()
				} else {
					return Err(ConfigError::Validation(format!(
						"Environment variable '{}' not found",
						var_name
					)));
				}
			},
		};

		replacements.push((full_match.start(), full_match.end(), value));
	}

	// Apply replacements in reverse order to maintain positions
	for (start, end, value) in replacements.iter().rev() {
		result.replace_range(start..end, value);
	}

	Ok(result)
}

impl Config {
	/// Loads configuration from a file.
	///
	/// Environment variables are resolved and the configuration is
	/// validated after parsing.
	pub fn from_file(path: &str) -> Result<Self, ConfigError> {
		let contents = std::fs::read_to_string(path)?;
		contents.parse()
	}

	/// Validates the configuration to ensure all required fields are properly set.
	///
	/// This method performs validation across all configuration sections:
	/// - Ensures the storage backend is specified and configured
	/// - Ensures the push backend is specified and configured
	/// - Validates the push timeout bounds
	/// - Validates the API bind port
	/// - Validates the revenue lookback window bounds
	fn validate(&self) -> Result<(), ConfigError> {
		// Validate storage config
		if self.storage.backend.is_empty() {
			return Err(ConfigError::Validation(
				"Storage backend cannot be empty".into(),
			));
		}
		if !self
			.storage
			.implementations
			.contains_key(&self.storage.backend)
		{
			return Err(ConfigError::Validation(format!(
				"Storage backend '{}' not found in implementations",
				self.storage.backend
			)));
		}

		// Validate push config
		if self.push.backend.is_empty() {
			return Err(ConfigError::Validation(
				"Push backend cannot be empty".into(),
			));
		}
		if !self.push.implementations.contains_key(&self.push.backend) {
			return Err(ConfigError::Validation(format!(
				"Push backend '{}' not found in implementations",
				self.push.backend
			)));
		}
		if self.push.timeout_ms == 0 {
			return Err(ConfigError::Validation(
				"Push timeout_ms must be greater than 0".into(),
			));
		}
		if self.push.timeout_ms > 60_000 {
			return Err(ConfigError::Validation(
				"Push timeout_ms cannot exceed 60000 (1 minute)".into(),
			));
		}

		// Validate API config
		if self.api.port == 0 {
			return Err(ConfigError::Validation("API port cannot be 0".into()));
		}

		// Validate reports config
		if self.reports.revenue_lookback_months == 0 {
			return Err(ConfigError::Validation(
				"Reports revenue_lookback_months must be at least 1".into(),
			));
		}
		if self.reports.revenue_lookback_months > 24 {
			return Err(ConfigError::Validation(
				"Reports revenue_lookback_months cannot exceed 24".into(),
			));
		}

		Ok(())
	}
}

/// Implementation of FromStr trait for Config to enable parsing from string.
///
/// This allows configuration to be parsed from TOML strings using the standard
/// string parsing interface. Environment variables are resolved and the
/// configuration is automatically validated after parsing.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_env_var_resolution() {
		// Set up test environment variables
		std::env::set_var("TEST_BIND_HOST", "localhost");
		std::env::set_var("TEST_BIND_PORT", "8080");

		let input = "host = \"${TEST_BIND_HOST}:${TEST_BIND_PORT}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "host = \"localhost:8080\"");

		// Clean up
		std::env::remove_var("TEST_BIND_HOST");
		std::env::remove_var("TEST_BIND_PORT");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "value = \"${MISSING_VAR:-default_value}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "value = \"default_value\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let input = "value = \"${MISSING_VAR}\"";
		let result = resolve_env_vars(input);
		assert!(result.is_err());
		assert!(result.unwrap_err().to_string().contains("MISSING_VAR"));
	}

	#[test]
	fn test_minimal_config_uses_defaults() {
		let config_str = r#"
[storage]
backend = "memory"
[storage.implementations.memory]
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.storage.backend, "memory");
		assert_eq!(config.push.backend, "log");
		assert_eq!(config.push.timeout_ms, 3000);
		assert_eq!(config.api.host, "127.0.0.1");
		assert_eq!(config.api.port, 3000);
		assert_eq!(config.reports.revenue_lookback_months, 3);
	}

	#[test]
	fn test_full_config_parses() {
		let config_str = r#"
[storage]
backend = "file"
[storage.implementations.file]
path = "./data/storage"

[push]
backend = "webhook"
timeout_ms = 1500
[push.implementations.webhook]
endpoint = "http://localhost:9200/push"
api_key = "${PUSH_API_KEY:-dev-key}"

[api]
host = "0.0.0.0"
port = 8080

[reports]
revenue_lookback_months = 6
"#;

		let config: Config = config_str.parse().unwrap();
		assert_eq!(config.storage.backend, "file");
		assert_eq!(config.push.backend, "webhook");
		assert_eq!(config.push.timeout_ms, 1500);
		assert_eq!(config.api.port, 8080);
		assert_eq!(config.reports.revenue_lookback_months, 6);

		let webhook = &config.push.implementations["webhook"];
		assert_eq!(
			webhook.get("api_key").and_then(|v| v.as_str()),
			Some("dev-key")
		);
	}

	#[test]
	fn test_unknown_storage_backend_rejected() {
		let config_str = r#"
[storage]
backend = "redis"
[storage.implementations.memory]
"#;

		let result: Result<Config, _> = config_str.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_unknown_push_backend_rejected() {
		let config_str = r#"
[storage]
backend = "memory"
[storage.implementations.memory]

[push]
backend = "webhook"
"#;

		let result: Result<Config, _> = config_str.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_zero_lookback_rejected() {
		let config_str = r#"
[storage]
backend = "memory"
[storage.implementations.memory]

[reports]
revenue_lookback_months = 0
"#;

		let result: Result<Config, _> = config_str.parse();
		assert!(matches!(result, Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_from_file_round_trip() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("config.toml");
		std::fs::write(
			&path,
			r#"
[storage]
backend = "memory"
[storage.implementations.memory]

[api]
port = 4100
"#,
		)
		.unwrap();

		let config = Config::from_file(path.to_str().unwrap()).unwrap();
		assert_eq!(config.api.port, 4100);
	}

	#[test]
	fn test_from_file_missing_path() {
		let result = Config::from_file("/definitely/not/here.toml");
		assert!(matches!(result, Err(ConfigError::Io(_))));
	}
}
