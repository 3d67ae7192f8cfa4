//! Equipment registry types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Operational status of a registered equipment unit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
	Normal,
	MaintenanceDue,
	UnderRepair,
	OutOfOrder,
	Retired,
}

impl fmt::Display for EquipmentStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			EquipmentStatus::Normal => "normal",
			EquipmentStatus::MaintenanceDue => "maintenance_due",
			EquipmentStatus::UnderRepair => "under_repair",
			EquipmentStatus::OutOfOrder => "out_of_order",
			EquipmentStatus::Retired => "retired",
		};
		write!(f, "{}", s)
	}
}

/// A registered equipment unit that service orders may reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Equipment {
	pub id: Uuid,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	/// Stored status, authoritative over any date-derived verdict.
	pub status: EquipmentStatus,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_service_date: Option<NaiveDate>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub next_service_date: Option<NaiveDate>,
	pub created_at: DateTime<Utc>,
}

impl Equipment {
	/// Status as reported to callers.
	///
	/// The stored status is authoritative. The next-service-date comparison
	/// only promotes `normal` to `maintenance_due`; an explicit repair or
	/// retirement verdict is never overridden by dates.
	pub fn effective_status(&self, today: NaiveDate) -> EquipmentStatus {
		match self.status {
			EquipmentStatus::Normal => match self.next_service_date {
				Some(due) if due <= today => EquipmentStatus::MaintenanceDue,
				_ => EquipmentStatus::Normal,
			},
			other => other,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn unit(status: EquipmentStatus, next: Option<NaiveDate>) -> Equipment {
		Equipment {
			id: Uuid::new_v4(),
			name: "AC unit 12F".to_string(),
			location: None,
			status,
			last_service_date: None,
			next_service_date: next,
			created_at: Utc::now(),
		}
	}

	fn day(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn test_elapsed_service_date_promotes_normal() {
		let eq = unit(EquipmentStatus::Normal, Some(day(2024, 1, 1)));
		assert_eq!(
			eq.effective_status(day(2024, 6, 1)),
			EquipmentStatus::MaintenanceDue
		);
		assert_eq!(
			eq.effective_status(day(2023, 6, 1)),
			EquipmentStatus::Normal
		);
	}

	#[test]
	fn test_stored_status_wins_over_dates() {
		let eq = unit(EquipmentStatus::UnderRepair, Some(day(2024, 1, 1)));
		assert_eq!(
			eq.effective_status(day(2024, 6, 1)),
			EquipmentStatus::UnderRepair
		);
		let retired = unit(EquipmentStatus::Retired, Some(day(2024, 1, 1)));
		assert_eq!(
			retired.effective_status(day(2024, 6, 1)),
			EquipmentStatus::Retired
		);
	}

	#[test]
	fn test_no_service_date_stays_normal() {
		let eq = unit(EquipmentStatus::Normal, None);
		assert_eq!(eq.effective_status(day(2024, 6, 1)), EquipmentStatus::Normal);
	}
}
