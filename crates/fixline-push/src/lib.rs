//! Push notification delivery module for the service order system.
//!
//! This module handles delivery of push messages to user devices. It
//! provides abstractions over concrete transports so the rest of the
//! system only deals with a device token, a title and a body. Delivery
//! is best-effort by design and every send is bounded by a timeout.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod log;
	pub mod webhook;
}

use implementations::{log::create_push as create_log, webhook::create_push as create_webhook};

/// Errors that can occur during push delivery operations.
#[derive(Debug, Error)]
pub enum PushError {
	/// Error that occurs during network communication.
	#[error("Network error: {0}")]
	Network(String),
	/// Error that occurs when the provider rejects the message.
	#[error("Push rejected: {0}")]
	Rejected(String),
	/// Error that occurs when a send exceeds the configured timeout.
	#[error("Push timed out after {0:?}")]
	Timeout(Duration),
	/// Error that occurs when the implementation is misconfigured.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the interface for push notification transports.
///
/// Implementations deliver a single message to a single device token.
/// They must not retry internally, retries and timeouts belong to the
/// service layer wrapping them.
#[async_trait]
pub trait PushInterface: Send + Sync {
	/// Sends one message to the given device token.
	async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), PushError>;
}

/// Service that manages push delivery through a configured transport.
///
/// The PushService wraps the selected implementation and enforces the
/// per-send timeout, so callers never block longer than configured on a
/// slow provider.
pub struct PushService {
	/// The underlying push implementation.
	implementation: Box<dyn PushInterface>,
	/// Upper bound applied to every send.
	timeout: Duration,
}

impl PushService {
	/// Creates a new PushService with the specified implementation and timeout.
	pub fn new(implementation: Box<dyn PushInterface>, timeout: Duration) -> Self {
		Self {
			implementation,
			timeout,
		}
	}

	/// Sends a message, mapping an elapsed deadline to PushError::Timeout.
	pub async fn send(
		&self,
		device_token: &str,
		title: &str,
		body: &str,
	) -> Result<(), PushError> {
		match tokio::time::timeout(
			self.timeout,
			self.implementation.send(device_token, title, body),
		)
		.await
		{
			Ok(result) => result,
			Err(_) => Err(PushError::Timeout(self.timeout)),
		}
	}
}

/// Type alias for push factory functions.
pub type PushFactory = fn(&toml::Value) -> Result<Box<dyn PushInterface>, PushError>;

/// Creates a push transport from its configured backend name.
pub fn create_transport(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn PushInterface>, PushError> {
	match name {
		"log" => create_log(config),
		"webhook" => create_webhook(config),
		other => Err(PushError::Configuration(format!(
			"Unknown push backend: {}",
			other
		))),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::atomic::{AtomicUsize, Ordering};
	use std::sync::Arc;

	struct SlowPush {
		delay: Duration,
		sends: Arc<AtomicUsize>,
	}

	#[async_trait]
	impl PushInterface for SlowPush {
		async fn send(&self, _token: &str, _title: &str, _body: &str) -> Result<(), PushError> {
			tokio::time::sleep(self.delay).await;
			self.sends.fetch_add(1, Ordering::SeqCst);
			Ok(())
		}
	}

	#[tokio::test]
	async fn test_send_within_deadline_succeeds() {
		let sends = Arc::new(AtomicUsize::new(0));
		let service = PushService::new(
			Box::new(SlowPush {
				delay: Duration::from_millis(5),
				sends: sends.clone(),
			}),
			Duration::from_millis(200),
		);

		service.send("token-1", "Title", "Body").await.unwrap();
		assert_eq!(sends.load(Ordering::SeqCst), 1);
	}

	#[tokio::test]
	async fn test_slow_send_times_out() {
		let sends = Arc::new(AtomicUsize::new(0));
		let service = PushService::new(
			Box::new(SlowPush {
				delay: Duration::from_secs(5),
				sends: sends.clone(),
			}),
			Duration::from_millis(20),
		);

		let result = service.send("token-1", "Title", "Body").await;
		assert!(matches!(result, Err(PushError::Timeout(_))));
		assert_eq!(sends.load(Ordering::SeqCst), 0);
	}

	#[test]
	fn test_create_transport_rejects_unknown_name() {
		let config = toml::Value::Table(Default::default());
		let result = create_transport("carrier-pigeon", &config);
		assert!(matches!(result, Err(PushError::Configuration(_))));
	}
}
