//! Webhook push transport.
//!
//! Posts each message as JSON to a configured HTTP endpoint. This fits
//! gateway-style providers that accept a device token plus payload and
//! fan out to the actual platform channels themselves.

use crate::{PushError, PushInterface};
use async_trait::async_trait;
use serde::Serialize;

/// Wire format accepted by the webhook endpoint.
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
	token: &'a str,
	title: &'a str,
	body: &'a str,
}

/// Push transport that forwards messages to an HTTP endpoint.
pub struct WebhookPush {
	/// Shared HTTP client with connection pooling.
	client: reqwest::Client,
	/// Endpoint URL receiving the JSON payload.
	endpoint: String,
	/// Optional bearer token attached to every request.
	api_key: Option<String>,
}

impl WebhookPush {
	/// Creates a new WebhookPush for the given endpoint.
	pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, PushError> {
		let client = reqwest::Client::builder()
			.pool_idle_timeout(std::time::Duration::from_secs(90))
			.pool_max_idle_per_host(10)
			.build()
			.map_err(|e| PushError::Configuration(e.to_string()))?;

		Ok(Self {
			client,
			endpoint,
			api_key,
		})
	}
}

#[async_trait]
impl PushInterface for WebhookPush {
	async fn send(&self, device_token: &str, title: &str, body: &str) -> Result<(), PushError> {
		let message = WebhookMessage {
			token: device_token,
			title,
			body,
		};

		let mut request = self.client.post(&self.endpoint).json(&message);
		if let Some(key) = &self.api_key {
			request = request.bearer_auth(key);
		}

		let response = request
			.send()
			.await
			.map_err(|e| PushError::Network(e.to_string()))?;

		let status = response.status();
		if status.is_success() {
			Ok(())
		} else {
			let detail = response.text().await.unwrap_or_default();
			Err(PushError::Rejected(format!(
				"Endpoint returned {}: {}",
				status, detail
			)))
		}
	}
}

/// Factory function to create a webhook push transport from configuration.
///
/// Configuration parameters:
/// - `endpoint`: URL receiving the JSON message (required)
/// - `api_key`: Bearer token sent with every request (optional)
pub fn create_push(config: &toml::Value) -> Result<Box<dyn PushInterface>, PushError> {
	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| PushError::Configuration("Webhook push requires 'endpoint'".into()))?
		.to_string();

	let api_key = config
		.get("api_key")
		.and_then(|v| v.as_str())
		.map(|s| s.to_string());

	Ok(Box::new(WebhookPush::new(endpoint, api_key)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_factory_requires_endpoint() {
		let config = toml::Value::Table(Default::default());
		let result = create_push(&config);
		assert!(matches!(result, Err(PushError::Configuration(_))));
	}

	#[test]
	fn test_factory_accepts_endpoint_and_key() {
		let config: toml::Value = toml::from_str(
			r#"
			endpoint = "http://localhost:9200/push"
			api_key = "secret"
			"#,
		)
		.unwrap();
		assert!(create_push(&config).is_ok());
	}

	#[test]
	fn test_message_wire_shape() {
		let message = WebhookMessage {
			token: "tok",
			title: "Title",
			body: "Body",
		};
		let json = serde_json::to_value(&message).unwrap();
		assert_eq!(json["token"], "tok");
		assert_eq!(json["title"], "Title");
		assert_eq!(json["body"], "Body");
	}
}
