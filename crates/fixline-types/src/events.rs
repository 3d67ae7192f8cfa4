//! Event types for lifecycle fan-out.
//!
//! Events flow through a broadcast bus and are also handed directly to the
//! fan-out dispatcher. An event is only ever emitted after the order write
//! has been persisted; idempotent no-op requests emit nothing.

use crate::order::{OrderStatus, ServiceOrder};
use serde::{Deserialize, Serialize};

/// Lifecycle event emitted once per successful creation or transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
	/// A new order entered the system in `pending_owner`.
	Created { order: ServiceOrder },
	/// An order moved from one status to another.
	Transitioned {
		from: OrderStatus,
		to: OrderStatus,
		order: ServiceOrder,
	},
}

impl LifecycleEvent {
	/// The order snapshot carried by the event.
	pub fn order(&self) -> &ServiceOrder {
		match self {
			LifecycleEvent::Created { order } => order,
			LifecycleEvent::Transitioned { order, .. } => order,
		}
	}

	/// The status the order is in after this event.
	pub fn status(&self) -> OrderStatus {
		match self {
			LifecycleEvent::Created { .. } => OrderStatus::PendingOwner,
			LifecycleEvent::Transitioned { to, .. } => *to,
		}
	}
}
