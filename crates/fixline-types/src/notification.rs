//! Notification record types.
//!
//! A notification row belongs to exactly one recipient and is never shared.
//! Content is immutable once created; only the read flag mutates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Classification tag for a notification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
	/// A new order entered the system.
	OrderCreated,
	/// A technician was assigned to an order.
	OrderAssigned,
	/// An order moved between in-flight statuses or was cancelled.
	OrderUpdated,
	/// An order was completed.
	OrderCompleted,
	/// Operational message not tied to a lifecycle transition.
	System,
}

/// A per-recipient notification record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
	pub id: Uuid,
	/// Recipient user.
	pub user_id: i64,
	pub kind: NotificationKind,
	pub title: String,
	pub body: String,
	/// Related order, when the notification stems from one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub order_id: Option<Uuid>,
	pub read: bool,
	pub created_at: DateTime<Utc>,
}

impl Notification {
	/// Creates an unread notification for the given recipient.
	pub fn new(
		user_id: i64,
		kind: NotificationKind,
		title: impl Into<String>,
		body: impl Into<String>,
		order_id: Option<Uuid>,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			user_id,
			kind,
			title: title.into(),
			body: body.into(),
			order_id,
			read: false,
			created_at: Utc::now(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_notification_starts_unread() {
		let n = Notification::new(5, NotificationKind::OrderCreated, "t", "b", None);
		assert!(!n.read);
		assert_eq!(n.user_id, 5);
	}

	#[test]
	fn test_kind_wire_names() {
		let json = serde_json::to_string(&NotificationKind::OrderAssigned).unwrap();
		assert_eq!(json, "\"order_assigned\"");
	}
}
