//! Message content for lifecycle notifications.
//!
//! Rendering is a pure function of the event, total over every status,
//! so a new lifecycle state cannot ship without notification copy. The
//! same rendered message goes to every recipient of an event.

use fixline_types::{LifecycleEvent, NotificationKind, OrderStatus, ServiceOrder};

/// Rendered notification content for one lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
	pub kind: NotificationKind,
	pub title: String,
	pub body: String,
}

/// Renders the notification content for a lifecycle event.
pub fn render(event: &LifecycleEvent) -> Message {
	let order = event.order();
	match event {
		LifecycleEvent::Created { .. } => Message {
			kind: NotificationKind::OrderCreated,
			title: "New service order".to_string(),
			body: format!(
				"Order {} was reported: {}",
				order.tracking_code, order.description
			),
		},
		LifecycleEvent::Transitioned { to, .. } => transition_message(*to, order),
	}
}

fn transition_message(to: OrderStatus, order: &ServiceOrder) -> Message {
	let code = &order.tracking_code;
	match to {
		OrderStatus::Approved => Message {
			kind: NotificationKind::OrderAssigned,
			title: "Order approved".to_string(),
			body: format!("Order {} was approved and assigned to a technician", code),
		},
		OrderStatus::InProgress => Message {
			kind: NotificationKind::OrderUpdated,
			title: "Work started".to_string(),
			body: format!("The technician started working on order {}", code),
		},
		OrderStatus::OnTheWay => Message {
			kind: NotificationKind::OrderUpdated,
			title: "Technician on the way".to_string(),
			body: format!("The technician is on the way for order {}", code),
		},
		OrderStatus::WaitingSpare => Message {
			kind: NotificationKind::OrderUpdated,
			title: "Waiting for spare part".to_string(),
			body: match &order.spare_part_name {
				Some(part) => format!("Order {} is waiting for a spare part: {}", code, part),
				None => format!("Order {} is waiting for a spare part", code),
			},
		},
		OrderStatus::Completed => Message {
			kind: NotificationKind::OrderCompleted,
			title: "Order completed".to_string(),
			body: match order.total_price {
				Some(price) => format!("Order {} was completed. Total price: {}", code, price),
				None => format!("Order {} was completed", code),
			},
		},
		OrderStatus::Cancelled => Message {
			kind: NotificationKind::OrderUpdated,
			title: "Order cancelled".to_string(),
			body: match &order.cancellation_reason {
				Some(reason) => format!("Order {} was cancelled: {}", code, reason),
				None => format!("Order {} was cancelled", code),
			},
		},
		// Orders enter pending_owner at creation; that path renders above.
		OrderStatus::PendingOwner => Message {
			kind: NotificationKind::OrderCreated,
			title: "New service order".to_string(),
			body: format!("Order {} was reported", code),
		},
	}
}
