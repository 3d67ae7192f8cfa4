//! Notification fan-out for lifecycle events.
//!
//! The dispatcher turns one lifecycle event into a set of per-recipient
//! notification records plus best-effort push deliveries. Record writes
//! are awaited so callers return only after the durable half of the
//! fan-out is committed; pushes are spawned and never awaited, and a
//! failed push leaves the records untouched.

pub mod messages;

use crate::repository::{Directory, NotificationStore};
use fixline_push::PushService;
use fixline_types::{LifecycleEvent, Notification, OrderStatus};
use futures::future::join_all;
use messages::{render, Message};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

/// Fans lifecycle events out to notification records and push messages.
pub struct Dispatcher {
	notifications: Arc<NotificationStore>,
	directory: Arc<Directory>,
	push: Arc<PushService>,
}

impl Dispatcher {
	pub fn new(
		notifications: Arc<NotificationStore>,
		directory: Arc<Directory>,
		push: Arc<PushService>,
	) -> Self {
		Self {
			notifications,
			directory,
			push,
		}
	}

	/// Delivers one lifecycle event to all of its recipients.
	///
	/// Returns the number of notification records created. Push failures
	/// and unresolvable recipients reduce deliveries, never error out.
	pub async fn dispatch(&self, event: &LifecycleEvent) -> usize {
		let recipients = self.recipients(event).await;
		if recipients.is_empty() {
			return 0;
		}

		let message = render(event);
		let order_id = event.order().id;

		let writes = recipients
			.iter()
			.map(|&user_id| self.notify(user_id, &message, order_id));
		let results = join_all(writes).await;
		results.into_iter().filter(|created| *created).count()
	}

	/// Resolves the recipient set for an event.
	///
	/// Creation goes to the owner and every admin; approval goes to the
	/// assigned technician's linked user and the reporting tenant; all
	/// later transitions go to the owner and the tenant. A missing owner
	/// simply narrows the set.
	async fn recipients(&self, event: &LifecycleEvent) -> BTreeSet<i64> {
		let order = event.order();
		let mut recipients = BTreeSet::new();

		match event {
			LifecycleEvent::Created { .. } => {
				if let Some(owner_id) = order.owner_id {
					recipients.insert(owner_id);
				}
				match self.directory.list_admins().await {
					Ok(admins) => recipients.extend(admins.iter().map(|admin| admin.id)),
					Err(e) => {
						tracing::warn!(error = %e, "Failed to resolve admin recipients")
					},
				}
			},
			LifecycleEvent::Transitioned {
				to: OrderStatus::Approved,
				..
			} => {
				if let Some(technician_id) = order.technician_id {
					match self.directory.find_user_for_technician(technician_id).await {
						Ok(Some(user)) => {
							recipients.insert(user.id);
						},
						Ok(None) => {
							tracing::debug!(
								technician_id,
								"Assigned technician has no linked user account"
							)
						},
						Err(e) => {
							tracing::warn!(error = %e, "Failed to resolve technician recipient")
						},
					}
				}
				recipients.insert(order.tenant_id);
			},
			LifecycleEvent::Transitioned { .. } => {
				if let Some(owner_id) = order.owner_id {
					recipients.insert(owner_id);
				}
				recipients.insert(order.tenant_id);
			},
		}

		recipients
	}

	/// Persists one recipient's record, then spawns the push attempt.
	async fn notify(&self, user_id: i64, message: &Message, order_id: Uuid) -> bool {
		let record = Notification::new(
			user_id,
			message.kind,
			message.title.clone(),
			message.body.clone(),
			Some(order_id),
		);
		if let Err(e) = self.notifications.create(&record).await {
			tracing::warn!(user_id, error = %e, "Failed to persist notification record");
			return false;
		}
		self.spawn_push(user_id, message);
		true
	}

	fn spawn_push(&self, user_id: i64, message: &Message) {
		let directory = self.directory.clone();
		let push = self.push.clone();
		let title = message.title.clone();
		let body = message.body.clone();

		tokio::spawn(async move {
			let user = match directory.get_user(user_id).await {
				Ok(user) => user,
				// No account record means no device token to push to.
				Err(_) => return,
			};
			if let Some(token) = user.device_token {
				if let Err(e) = push.send(&token, &title, &body).await {
					tracing::debug!(user_id, error = %e, "Push delivery failed");
				}
			}
		});
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use async_trait::async_trait;
	use fixline_push::{PushError, PushInterface};
	use fixline_storage::implementations::memory::MemoryStorage;
	use fixline_storage::StorageService;
	use fixline_types::{NewOrder, Role, ServiceCategory, ServiceOrder, User};
	use std::time::Duration;
	use tokio::sync::mpsc;

	struct RecordingPush {
		sent: mpsc::UnboundedSender<(String, String)>,
	}

	#[async_trait]
	impl PushInterface for RecordingPush {
		async fn send(&self, device_token: &str, _title: &str, body: &str) -> Result<(), PushError> {
			self.sent
				.send((device_token.to_string(), body.to_string()))
				.ok();
			Ok(())
		}
	}

	struct FailingPush;

	#[async_trait]
	impl PushInterface for FailingPush {
		async fn send(&self, _: &str, _: &str, _: &str) -> Result<(), PushError> {
			Err(PushError::Network("gateway unreachable".to_string()))
		}
	}

	struct Fixture {
		dispatcher: Dispatcher,
		notifications: Arc<NotificationStore>,
	}

	async fn fixture_with(push: Box<dyn PushInterface>) -> Fixture {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		let notifications = Arc::new(NotificationStore::new(storage.clone()));
		let directory = Arc::new(Directory::new(storage));
		let push = Arc::new(PushService::new(push, Duration::from_secs(1)));

		// Admins 1 and 30, owner 2, tenant 5, technician user 40 linked
		// to technician record 9. Tokens only for the tenant and the
		// technician user.
		let users = [
			User {
				id: 1,
				username: "admin1".into(),
				role: Role::Admin,
				technician_id: None,
				device_token: None,
			},
			User {
				id: 30,
				username: "admin30".into(),
				role: Role::Admin,
				technician_id: None,
				device_token: None,
			},
			User {
				id: 2,
				username: "owner".into(),
				role: Role::Owner,
				technician_id: None,
				device_token: None,
			},
			User {
				id: 5,
				username: "tenant".into(),
				role: Role::Tenant,
				technician_id: None,
				device_token: Some("tok-tenant".into()),
			},
			User {
				id: 40,
				username: "tech".into(),
				role: Role::Technician,
				technician_id: Some(9),
				device_token: Some("tok-tech".into()),
			},
		];
		for user in &users {
			directory.upsert_user(user).await.unwrap();
		}

		Fixture {
			dispatcher: Dispatcher::new(notifications.clone(), directory, push),
			notifications,
		}
	}

	async fn recording_fixture() -> (Fixture, mpsc::UnboundedReceiver<(String, String)>) {
		let (tx, rx) = mpsc::unbounded_channel();
		let fixture = fixture_with(Box::new(RecordingPush { sent: tx })).await;
		(fixture, rx)
	}

	fn order() -> ServiceOrder {
		ServiceOrder::create(
			5,
			NewOrder {
				category: ServiceCategory::NotCold,
				description: "fridge not cooling".to_string(),
				owner_id: Some(2),
				equipment_id: None,
				tenant_image: None,
			},
		)
	}

	fn approved_order() -> ServiceOrder {
		let mut order = order();
		order.status = OrderStatus::Approved;
		order.technician_id = Some(9);
		order
	}

	#[tokio::test]
	async fn test_created_event_reaches_owner_and_admins() {
		let (fixture, _pushes) = recording_fixture().await;
		let created = fixture
			.dispatcher
			.dispatch(&LifecycleEvent::Created { order: order() })
			.await;
		assert_eq!(created, 3);

		for user_id in [1, 2, 30] {
			let records = fixture
				.notifications
				.list_for_user(user_id, false)
				.await
				.unwrap();
			assert_eq!(records.len(), 1, "user {}", user_id);
		}
		// The tenant is not notified about their own report.
		assert!(fixture
			.notifications
			.list_for_user(5, false)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_approval_reaches_technician_user_and_tenant() {
		let (fixture, mut pushes) = recording_fixture().await;
		let event = LifecycleEvent::Transitioned {
			from: OrderStatus::PendingOwner,
			to: OrderStatus::Approved,
			order: approved_order(),
		};
		let created = fixture.dispatcher.dispatch(&event).await;
		assert_eq!(created, 2);

		for user_id in [5, 40] {
			let records = fixture
				.notifications
				.list_for_user(user_id, false)
				.await
				.unwrap();
			assert_eq!(records.len(), 1, "user {}", user_id);
		}

		// Both recipients carry a device token, so both get pushes.
		let mut tokens = vec![
			pushes.recv().await.unwrap().0,
			pushes.recv().await.unwrap().0,
		];
		tokens.sort();
		assert_eq!(tokens, vec!["tok-tech", "tok-tenant"]);
	}

	#[tokio::test]
	async fn test_progress_update_reaches_owner_and_tenant() {
		let (fixture, _pushes) = recording_fixture().await;
		let mut order = approved_order();
		order.status = OrderStatus::InProgress;
		let event = LifecycleEvent::Transitioned {
			from: OrderStatus::Approved,
			to: OrderStatus::InProgress,
			order,
		};
		assert_eq!(fixture.dispatcher.dispatch(&event).await, 2);

		for user_id in [2, 5] {
			let records = fixture
				.notifications
				.list_for_user(user_id, false)
				.await
				.unwrap();
			assert_eq!(records.len(), 1, "user {}", user_id);
		}
		assert!(fixture
			.notifications
			.list_for_user(40, false)
			.await
			.unwrap()
			.is_empty());
	}

	#[tokio::test]
	async fn test_missing_owner_narrows_recipients() {
		let (fixture, _pushes) = recording_fixture().await;
		let mut order = order();
		order.owner_id = None;
		assert_eq!(
			fixture
				.dispatcher
				.dispatch(&LifecycleEvent::Created { order })
				.await,
			2
		);
	}

	#[tokio::test]
	async fn test_push_failures_leave_records_intact() {
		let fixture = fixture_with(Box::new(FailingPush)).await;
		let mut order = approved_order();
		order.status = OrderStatus::Completed;
		order.total_price = Some(rust_decimal::Decimal::from(450));
		let event = LifecycleEvent::Transitioned {
			from: OrderStatus::InProgress,
			to: OrderStatus::Completed,
			order,
		};

		assert_eq!(fixture.dispatcher.dispatch(&event).await, 2);
		for user_id in [2, 5] {
			let records = fixture
				.notifications
				.list_for_user(user_id, false)
				.await
				.unwrap();
			assert_eq!(records.len(), 1);
			assert!(records[0].body.contains("450"));
		}
	}
}
