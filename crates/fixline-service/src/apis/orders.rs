//! Order lifecycle endpoints.
//!
//! This module implements creation, listing, lookup, and status transitions
//! for service orders. Every handler receives the verified actor from the
//! identity headers; read scoping and transition rules are enforced by the
//! lifecycle engine, so handlers stay thin.

use axum::{
	extract::{Path, State},
	http::StatusCode,
	response::Json,
};
use fixline_types::{ApiError, NewOrder, Role, ServiceOrder, TransitionRequest};
use tracing::warn;
use uuid::Uuid;

use crate::apis::{map_engine_error, ActorContext};
use crate::server::AppState;

/// Handles POST /api/orders requests.
///
/// Tenants report a new issue here. The order starts in `pending_owner`
/// and the owner and admins are notified.
pub async fn create_order(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Json(request): Json<NewOrder>,
) -> Result<(StatusCode, Json<ServiceOrder>), ApiError> {
	if actor.role != Role::Tenant {
		return Err(ApiError::Forbidden(
			"only tenants may report service orders".to_string(),
		));
	}
	match state.engine.create_order(actor.user_id, request).await {
		Ok(order) => Ok((StatusCode::CREATED, Json(order))),
		Err(e) => {
			warn!("Order creation failed: {}", e);
			Err(map_engine_error(e))
		}
	}
}

/// Handles GET /api/orders requests.
///
/// Returns the orders visible to the caller, newest first. Admins and
/// owners see everything, technicians their assignments, tenants their
/// own reports.
pub async fn list_orders(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
) -> Result<Json<Vec<ServiceOrder>>, ApiError> {
	match state.engine.list_orders(&actor).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			warn!("Order listing failed: {}", e);
			Err(map_engine_error(e))
		}
	}
}

/// Handles GET /api/orders/{id} requests.
///
/// Orders outside the caller's scope come back 404, not 403, so the
/// response does not reveal that the order exists.
pub async fn get_order(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Path(id): Path<Uuid>,
) -> Result<Json<ServiceOrder>, ApiError> {
	match state.engine.get_order(&id, &actor).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			warn!("Order retrieval failed for {}: {}", id, e);
			Err(map_engine_error(e))
		}
	}
}

/// Handles GET /api/orders/tracking/{code} requests.
///
/// Tracking codes are matched case-insensitively. Scope rules are the
/// same as for lookup by id.
pub async fn get_order_by_tracking(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Path(code): Path<String>,
) -> Result<Json<ServiceOrder>, ApiError> {
	match state.engine.get_order_by_tracking(&code, &actor).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			warn!("Order retrieval failed for tracking code {}: {}", code, e);
			Err(map_engine_error(e))
		}
	}
}

/// Handles POST /api/orders/{id}/transition requests.
///
/// Requests a status change on behalf of the caller. The engine decides
/// authorization, legality, and payload validity; a retried request that
/// targets the order's current status succeeds without changing anything.
pub async fn transition_order(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Path(id): Path<Uuid>,
	Json(request): Json<TransitionRequest>,
) -> Result<Json<ServiceOrder>, ApiError> {
	match state
		.engine
		.request_transition(&id, &actor, request.target, request.payload)
		.await
	{
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			warn!(
				"Transition to {} failed for order {}: {}",
				request.target, id, e
			);
			Err(map_engine_error(e))
		}
	}
}
