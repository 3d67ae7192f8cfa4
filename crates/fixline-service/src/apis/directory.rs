//! User and technician directory endpoints.
//!
//! Account and technician records originate in the upstream identity
//! system; these endpoints mirror them into the directory so recipient
//! resolution and role scoping can run locally. Ids arrive with the
//! records and are never assigned here.

use axum::{extract::State, http::StatusCode, response::Json};
use fixline_types::{ApiError, Role, Technician, User};
use tracing::warn;

use crate::apis::{map_storage_error, ActorContext};
use crate::server::AppState;

/// Handles POST /api/users requests.
///
/// Upserts a directory record for a user account. Admin only.
pub async fn create_user(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Json(user): Json<User>,
) -> Result<(StatusCode, Json<User>), ApiError> {
	if actor.role != Role::Admin {
		return Err(ApiError::Forbidden(
			"only admins may manage user records".to_string(),
		));
	}
	match state.engine.directory().upsert_user(&user).await {
		Ok(()) => Ok((StatusCode::CREATED, Json(user))),
		Err(e) => {
			warn!("User upsert failed for {}: {}", user.id, e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles POST /api/technicians requests.
///
/// Registers a technician record. Admin only.
pub async fn create_technician(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Json(technician): Json<Technician>,
) -> Result<(StatusCode, Json<Technician>), ApiError> {
	if actor.role != Role::Admin {
		return Err(ApiError::Forbidden(
			"only admins may manage technician records".to_string(),
		));
	}
	match state.engine.directory().create_technician(&technician).await {
		Ok(()) => Ok((StatusCode::CREATED, Json(technician))),
		Err(e) => {
			warn!("Technician registration failed for {}: {}", technician.id, e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles GET /api/technicians requests.
///
/// Lists registered technicians for assignment pickers. Owners and admins
/// only, since they are the roles that approve and assign.
pub async fn list_technicians(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
) -> Result<Json<Vec<Technician>>, ApiError> {
	if !matches!(actor.role, Role::Admin | Role::Owner) {
		return Err(ApiError::Forbidden(
			"technician listing is restricted to owners and admins".to_string(),
		));
	}
	match state.engine.directory().list_technicians().await {
		Ok(technicians) => Ok(Json(technicians)),
		Err(e) => {
			warn!("Technician listing failed: {}", e);
			Err(map_storage_error(e))
		}
	}
}
