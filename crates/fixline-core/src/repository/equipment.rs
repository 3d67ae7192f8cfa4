//! Equipment registry persistence.

use chrono::{Months, NaiveDate, Utc};
use fixline_storage::{StorageError, StorageService};
use fixline_types::{Equipment, EquipmentStatus, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// Service interval applied when registering a unit.
const SERVICE_INTERVAL_MONTHS: u32 = 6;

/// Repository for registered equipment units.
pub struct EquipmentRegistry {
	storage: Arc<StorageService>,
}

impl EquipmentRegistry {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	/// Registers a unit.
	///
	/// `last_service_date` defaults to today, and the next service date
	/// is scheduled one interval after it.
	pub async fn create(
		&self,
		name: String,
		location: Option<String>,
		last_service_date: Option<NaiveDate>,
	) -> Result<Equipment, StorageError> {
		let last = last_service_date.unwrap_or_else(|| Utc::now().date_naive());
		let equipment = Equipment {
			id: Uuid::new_v4(),
			name,
			location,
			status: EquipmentStatus::Normal,
			last_service_date: Some(last),
			next_service_date: last.checked_add_months(Months::new(SERVICE_INTERVAL_MONTHS)),
			created_at: Utc::now(),
		};
		self.storage
			.store(
				StorageKey::Equipment.as_str(),
				&equipment.id.to_string(),
				&equipment,
			)
			.await?;
		Ok(equipment)
	}

	pub async fn get(&self, id: &Uuid) -> Result<Equipment, StorageError> {
		self.storage
			.retrieve(StorageKey::Equipment.as_str(), &id.to_string())
			.await
	}

	/// Lists all units, newest registration first.
	pub async fn list(&self) -> Result<Vec<Equipment>, StorageError> {
		let mut units: Vec<Equipment> = self.storage.list(StorageKey::Equipment.as_str()).await?;
		units.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(units)
	}

	/// Overwrites the stored status verdict for a unit.
	pub async fn set_status(
		&self,
		id: &Uuid,
		status: EquipmentStatus,
	) -> Result<Equipment, StorageError> {
		let mut equipment: Equipment = self
			.storage
			.retrieve(StorageKey::Equipment.as_str(), &id.to_string())
			.await?;
		equipment.status = status;
		self.storage
			.update(StorageKey::Equipment.as_str(), &id.to_string(), &equipment)
			.await?;
		Ok(equipment)
	}
}
