//! Logging push transport.
//!
//! Writes every message to the log instead of delivering it anywhere.
//! This is the default transport, suitable for development and for
//! deployments that have not wired a real provider yet.

use crate::{PushError, PushInterface};
use async_trait::async_trait;

/// Push transport that records messages in the service log.
pub struct LogPush;

#[async_trait]
impl PushInterface for LogPush {
	async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), PushError> {
		tracing::info!(
			device_token = %device_token,
			title = %title,
			body = %body,
			"Push message (log transport)"
		);
		Ok(())
	}
}

/// Factory function to create a log push transport from configuration.
///
/// Configuration parameters:
/// - None required for the log transport
pub fn create_push(_config: &toml::Value) -> Result<Box<dyn PushInterface>, PushError> {
	Ok(Box::new(LogPush))
}
