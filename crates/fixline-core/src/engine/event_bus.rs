//! Broadcast channel for lifecycle events.
//!
//! Events are published after an order write has been persisted and its
//! notification fan-out recorded, so subscribers only ever observe
//! committed state. Publishing never blocks; slow subscribers lag and
//! miss events rather than backpressure the engine.

use fixline_types::LifecycleEvent;
use tokio::sync::broadcast;

/// Cloneable handle to the lifecycle event channel.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<LifecycleEvent>,
}

impl EventBus {
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns Err only when nobody is subscribed; callers that do not
	/// care discard it with `.ok()`.
	pub fn publish(
		&self,
		event: LifecycleEvent,
	) -> Result<usize, broadcast::error::SendError<LifecycleEvent>> {
		self.sender.send(event)
	}

	pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fixline_types::{NewOrder, ServiceCategory, ServiceOrder};

	fn sample_event() -> LifecycleEvent {
		let order = ServiceOrder::create(
			5,
			NewOrder {
				category: ServiceCategory::Cleaning,
				description: "filter clean".to_string(),
				owner_id: Some(2),
				equipment_id: None,
				tenant_image: None,
			},
		);
		LifecycleEvent::Created { order }
	}

	#[tokio::test]
	async fn test_subscribers_receive_published_events() {
		let bus = EventBus::new(16);
		let mut rx_a = bus.subscribe();
		let mut rx_b = bus.subscribe();

		bus.publish(sample_event()).unwrap();

		let got_a = rx_a.recv().await.unwrap();
		let got_b = rx_b.recv().await.unwrap();
		assert_eq!(got_a.order().id, got_b.order().id);
	}

	#[test]
	fn test_publish_without_subscribers_errs() {
		let bus = EventBus::new(16);
		assert!(bus.publish(sample_event()).is_err());
	}
}
