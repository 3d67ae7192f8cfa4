//! Service-order types for the fixline system.
//!
//! This module defines the ServiceOrder record and its lifecycle vocabulary:
//! the status enum, the service categories tenants report, and the payload
//! carried by transition requests.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle status of a service order.
///
/// Every order starts in `PendingOwner` and ends in one of the terminal
/// states `Completed` or `Cancelled`. The in-flight technician statuses
/// (`InProgress`, `OnTheWay`, `WaitingSpare`) may alternate freely.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
	/// Awaiting owner review; set at creation, never requestable.
	PendingOwner,
	/// Owner or admin approved the job and assigned a technician.
	Approved,
	/// Technician is working on the job.
	InProgress,
	/// Technician is travelling to the unit.
	OnTheWay,
	/// Work paused until a spare part arrives.
	WaitingSpare,
	/// Job finished with a recorded price. Terminal.
	Completed,
	/// Abandoned with a recorded reason. Terminal.
	Cancelled,
}

impl OrderStatus {
	/// True when no further transitions are possible from this status.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
	}

	/// Returns an iterator over all status variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::PendingOwner,
			Self::Approved,
			Self::InProgress,
			Self::OnTheWay,
			Self::WaitingSpare,
			Self::Completed,
			Self::Cancelled,
		]
		.into_iter()
	}

	/// Returns the wire representation of the status.
	pub fn as_str(&self) -> &'static str {
		match self {
			OrderStatus::PendingOwner => "pending_owner",
			OrderStatus::Approved => "approved",
			OrderStatus::InProgress => "in_progress",
			OrderStatus::OnTheWay => "on_the_way",
			OrderStatus::WaitingSpare => "waiting_spare",
			OrderStatus::Completed => "completed",
			OrderStatus::Cancelled => "cancelled",
		}
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for OrderStatus {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"pending_owner" => Ok(Self::PendingOwner),
			"approved" => Ok(Self::Approved),
			"in_progress" => Ok(Self::InProgress),
			"on_the_way" => Ok(Self::OnTheWay),
			"waiting_spare" => Ok(Self::WaitingSpare),
			"completed" => Ok(Self::Completed),
			"cancelled" => Ok(Self::Cancelled),
			_ => Err(()),
		}
	}
}

/// Service category reported by the tenant at creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
	Cleaning,
	NotCold,
	Leaking,
	Noise,
	Other,
}

impl fmt::Display for ServiceCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			ServiceCategory::Cleaning => "cleaning",
			ServiceCategory::NotCold => "not_cold",
			ServiceCategory::Leaking => "leaking",
			ServiceCategory::Noise => "noise",
			ServiceCategory::Other => "other",
		};
		write!(f, "{}", s)
	}
}

/// A single repair/maintenance job tracked from report to resolution.
///
/// Records are persisted with an explicit schema version (see the storage
/// crate). Field invariants: `tenant_id` is always set; `technician_id` is
/// set exactly when the order has progressed past approval; `total_price`
/// only when completed; `cancellation_reason` only when cancelled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceOrder {
	/// Unique order identifier.
	pub id: Uuid,
	/// Human-readable tracking code, unique and immutable after creation.
	pub tracking_code: String,
	/// Tenant who reported the issue.
	pub tenant_id: i64,
	/// Owner of the unit, when known.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_id: Option<i64>,
	/// Assigned technician, set during approval.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub technician_id: Option<i64>,
	/// Linked equipment unit, when the report concerns one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub equipment_id: Option<Uuid>,
	/// Reported service category.
	pub category: ServiceCategory,
	/// Free-text problem description.
	pub description: String,
	/// Image reference submitted by the tenant at creation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tenant_image: Option<String>,
	/// Before-work image reference, set by the technician.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub before_image: Option<String>,
	/// After-work image reference, set by the technician.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub after_image: Option<String>,
	/// Total price, recorded on completion.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_price: Option<Decimal>,
	/// Current lifecycle status.
	pub status: OrderStatus,
	/// Spare part being waited on, meaningful in waiting_spare.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub spare_part_name: Option<String>,
	/// Expected spare-part arrival date, meaningful in waiting_spare.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub spare_part_eta: Option<NaiveDate>,
	/// Why the order was cancelled, recorded on cancellation.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cancellation_reason: Option<String>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl ServiceOrder {
	/// Creates a new order in the initial `pending_owner` status.
	///
	/// The id, tracking code, status, and timestamps are assigned here and
	/// are never caller-selectable.
	pub fn create(tenant_id: i64, new: NewOrder) -> Self {
		let id = Uuid::new_v4();
		let now = Utc::now();
		Self {
			tracking_code: tracking_code_for(&id),
			id,
			tenant_id,
			owner_id: new.owner_id,
			technician_id: None,
			equipment_id: new.equipment_id,
			category: new.category,
			description: new.description,
			tenant_image: new.tenant_image,
			before_image: None,
			after_image: None,
			total_price: None,
			status: OrderStatus::PendingOwner,
			spare_part_name: None,
			spare_part_eta: None,
			cancellation_reason: None,
			created_at: now,
			updated_at: now,
		}
	}

	/// True when no further transitions are possible.
	pub fn is_terminal(&self) -> bool {
		self.status.is_terminal()
	}
}

/// Derives the human-readable tracking code for an order id.
///
/// Codes look like `SRV-9BD23A41`. Uniqueness follows from the id.
pub fn tracking_code_for(id: &Uuid) -> String {
	let hex = id.simple().to_string();
	format!("SRV-{}", hex[..8].to_uppercase())
}

/// Caller-supplied fields for creating an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
	pub category: ServiceCategory,
	pub description: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub owner_id: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub equipment_id: Option<Uuid>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tenant_image: Option<String>,
}

/// Transition-specific fields accompanying a status change request.
///
/// Which fields are required depends on the target status; fields that do
/// not apply to the requested target are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransitionPayload {
	/// Technician to assign; required when the target is `approved`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub technician_id: Option<i64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub before_image: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub after_image: Option<String>,
	/// Required non-negative when the target is `completed`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_price: Option<Decimal>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub spare_part_name: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub spare_part_eta: Option<NaiveDate>,
	/// Required non-empty when the target is `cancelled`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cancellation_reason: Option<String>,
}

impl TransitionPayload {
	/// Payload assigning a technician, for approval requests.
	pub fn assign(technician_id: i64) -> Self {
		Self {
			technician_id: Some(technician_id),
			..Default::default()
		}
	}

	/// Payload recording a completion price.
	pub fn complete(total_price: Decimal) -> Self {
		Self {
			total_price: Some(total_price),
			..Default::default()
		}
	}

	/// Payload recording a cancellation reason.
	pub fn cancel(reason: impl Into<String>) -> Self {
		Self {
			cancellation_reason: Some(reason.into()),
			..Default::default()
		}
	}
}
