//! Equipment registry endpoints.
//!
//! Reads report the effective status: a unit stored as `normal` whose
//! next service date has passed comes back as `maintenance_due`. The
//! stored record is never rewritten by that promotion.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use chrono::Utc;
use fixline_types::{ApiError, Equipment, EquipmentStatusRequest, NewEquipmentRequest, Role};
use tracing::warn;
use uuid::Uuid;

use crate::apis::{map_storage_error, ActorContext};
use crate::server::AppState;

fn with_effective_status(mut equipment: Equipment) -> Equipment {
	equipment.status = equipment.effective_status(Utc::now().date_naive());
	equipment
}

/// Handles POST /api/equipment requests.
///
/// Registers a unit; the next service date is scheduled automatically
/// from the last service date. Admin only.
pub async fn create_equipment(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Json(request): Json<NewEquipmentRequest>,
) -> Result<(StatusCode, Json<Equipment>), ApiError> {
	if actor.role != Role::Admin {
		return Err(ApiError::Forbidden(
			"only admins may register equipment".to_string(),
		));
	}
	match state
		.engine
		.equipment()
		.create(request.name, request.location, request.last_service_date)
		.await
	{
		Ok(equipment) => Ok((StatusCode::CREATED, Json(with_effective_status(equipment)))),
		Err(e) => {
			warn!("Equipment registration failed: {}", e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles GET /api/equipment requests.
///
/// Lists registered units, newest first. Visible to every authenticated
/// role so tenants can pick the unit they are reporting about.
pub async fn list_equipment(
	State(state): State<AppState>,
	ActorContext(_actor): ActorContext,
) -> Result<Json<Vec<Equipment>>, ApiError> {
	match state.engine.equipment().list().await {
		Ok(equipment) => Ok(Json(
			equipment.into_iter().map(with_effective_status).collect(),
		)),
		Err(e) => {
			warn!("Equipment listing failed: {}", e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles PUT /api/equipment/{id}/status requests.
///
/// Overrides the stored status of a unit. Admin only.
pub async fn set_equipment_status(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Path(id): Path<Uuid>,
	Json(request): Json<EquipmentStatusRequest>,
) -> Result<Json<Equipment>, ApiError> {
	if actor.role != Role::Admin {
		return Err(ApiError::Forbidden(
			"only admins may change equipment status".to_string(),
		));
	}
	match state.engine.equipment().set_status(&id, request.status).await {
		Ok(equipment) => Ok(Json(with_effective_status(equipment))),
		Err(e) => {
			warn!("Equipment status update failed for {}: {}", id, e);
			Err(map_storage_error(e))
		}
	}
}
