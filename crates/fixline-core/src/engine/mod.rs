//! Lifecycle engine orchestrating service orders.
//!
//! The engine owns the write path: creation, checked transitions with
//! optimistic concurrency, and the post-persist fan-out. Reads go through
//! the same surface so role scoping is applied in exactly one place.
//! Persistence, fan-out and event subscribers are injected, which keeps
//! the engine buildable against in-memory backends in tests.

pub mod event_bus;

use crate::dispatch::Dispatcher;
use crate::repository::{
	visible_to, Directory, EquipmentRegistry, NotificationStore, OrderRepository,
};
use crate::state::{apply_transition, check_transition, OrderStateError, TransitionOutcome};
use chrono::Utc;
use event_bus::EventBus;
use fixline_storage::StorageError;
use fixline_types::{
	Actor, LifecycleEvent, NewOrder, OrderStatus, ReportStats, ServiceOrder, TransitionPayload,
};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
	/// The order does not exist, or is outside the actor's read scope.
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The request failed an authorization, legality or payload rule.
	#[error("State error: {0}")]
	State(#[from] OrderStateError),
	/// A concurrent transition persisted first; retry with fresh state.
	#[error("Order was modified concurrently")]
	Conflict,
	#[error("Storage error: {0}")]
	Storage(String),
}

/// Coordinates order state, notification fan-out and event publishing.
pub struct LifecycleEngine {
	orders: Arc<OrderRepository>,
	notifications: Arc<NotificationStore>,
	directory: Arc<Directory>,
	equipment: Arc<EquipmentRegistry>,
	dispatcher: Arc<Dispatcher>,
	event_bus: EventBus,
	revenue_lookback_months: u32,
}

impl LifecycleEngine {
	#[allow(clippy::too_many_arguments)]
	pub fn new(
		orders: Arc<OrderRepository>,
		notifications: Arc<NotificationStore>,
		directory: Arc<Directory>,
		equipment: Arc<EquipmentRegistry>,
		dispatcher: Arc<Dispatcher>,
		event_bus: EventBus,
		revenue_lookback_months: u32,
	) -> Self {
		Self {
			orders,
			notifications,
			directory,
			equipment,
			dispatcher,
			event_bus,
			revenue_lookback_months,
		}
	}

	pub fn notifications(&self) -> &NotificationStore {
		&self.notifications
	}

	pub fn directory(&self) -> &Directory {
		&self.directory
	}

	pub fn equipment(&self) -> &EquipmentRegistry {
		&self.equipment
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Registers a new service order reported by a tenant.
	///
	/// The order starts in `pending_owner`; the owner and all admins are
	/// notified once the record is durable.
	pub async fn create_order(
		&self,
		tenant_id: i64,
		new_order: NewOrder,
	) -> Result<ServiceOrder, EngineError> {
		let order = ServiceOrder::create(tenant_id, new_order);
		self.orders
			.insert(&order)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?;

		let event = LifecycleEvent::Created {
			order: order.clone(),
		};
		let delivered = self.dispatcher.dispatch(&event).await;
		tracing::info!(
			order_id = %order.id,
			tracking_code = %order.tracking_code,
			notifications = delivered,
			"Service order created"
		);
		self.event_bus.publish(event).ok();

		Ok(order)
	}

	/// Requests a status transition on behalf of an actor.
	///
	/// The write is guarded on the snapshot this call read: a concurrent
	/// transition that lands first surfaces as [`EngineError::Conflict`].
	/// A request for the status the order is already in succeeds without
	/// writing or emitting anything.
	pub async fn request_transition(
		&self,
		order_id: &Uuid,
		actor: &Actor,
		target: OrderStatus,
		payload: TransitionPayload,
	) -> Result<ServiceOrder, EngineError> {
		let prior = self.orders.get(order_id).await.map_err(|e| match e {
			StorageError::NotFound => EngineError::NotFound(order_id.to_string()),
			other => EngineError::Storage(other.to_string()),
		})?;

		match check_transition(&prior, target, actor, &payload)? {
			TransitionOutcome::Noop => {
				tracing::debug!(
					order_id = %prior.id,
					status = %prior.status,
					"Transition retry ignored"
				);
				return Ok(prior);
			},
			TransitionOutcome::Apply => {},
		}

		// Approval must reference a technician that actually exists.
		if target == OrderStatus::Approved {
			if let Some(technician_id) = payload.technician_id {
				self.directory
					.get_technician(technician_id)
					.await
					.map_err(|e| match e {
						StorageError::NotFound => {
							EngineError::State(OrderStateError::Validation(format!(
								"technician {} does not exist",
								technician_id
							)))
						},
						other => EngineError::Storage(other.to_string()),
					})?;
			}
		}

		let updated = apply_transition(&prior, target, &payload);
		self.orders
			.update_guarded(&prior, &updated)
			.await
			.map_err(|e| match e {
				StorageError::Conflict => EngineError::Conflict,
				StorageError::NotFound => EngineError::NotFound(order_id.to_string()),
				other => EngineError::Storage(other.to_string()),
			})?;

		let event = LifecycleEvent::Transitioned {
			from: prior.status,
			to: target,
			order: updated.clone(),
		};
		let delivered = self.dispatcher.dispatch(&event).await;
		tracing::info!(
			order_id = %updated.id,
			from = %prior.status,
			to = %target,
			notifications = delivered,
			"Order transitioned"
		);
		self.event_bus.publish(event).ok();

		Ok(updated)
	}

	/// Fetches one order, applying the actor's read scope.
	///
	/// Orders outside the scope report `NotFound` rather than revealing
	/// that they exist.
	pub async fn get_order(
		&self,
		order_id: &Uuid,
		actor: &Actor,
	) -> Result<ServiceOrder, EngineError> {
		let order = self.orders.get(order_id).await.map_err(|e| match e {
			StorageError::NotFound => EngineError::NotFound(order_id.to_string()),
			other => EngineError::Storage(other.to_string()),
		})?;
		if !visible_to(actor, &order) {
			return Err(EngineError::NotFound(order_id.to_string()));
		}
		Ok(order)
	}

	/// Fetches one order by tracking code, applying the actor's read scope.
	pub async fn get_order_by_tracking(
		&self,
		code: &str,
		actor: &Actor,
	) -> Result<ServiceOrder, EngineError> {
		let order = self
			.orders
			.get_by_tracking(code)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))?
			.ok_or_else(|| EngineError::NotFound(code.to_string()))?;
		if !visible_to(actor, &order) {
			return Err(EngineError::NotFound(code.to_string()));
		}
		Ok(order)
	}

	/// Lists the orders visible to an actor, newest first.
	pub async fn list_orders(&self, actor: &Actor) -> Result<Vec<ServiceOrder>, EngineError> {
		self.orders
			.list_scoped(actor)
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))
	}

	/// Aggregate statistics over completed orders for the dashboard.
	pub async fn report_stats(&self) -> Result<ReportStats, EngineError> {
		self.orders
			.stats(self.revenue_lookback_months, Utc::now())
			.await
			.map_err(|e| EngineError::Storage(e.to_string()))
	}
}
