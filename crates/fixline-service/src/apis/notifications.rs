//! Notification endpoints.
//!
//! Callers only ever see their own notification records; the recipient
//! scope is the authenticated user id, whatever the role. Device-token
//! registration lives here too since its sole consumer is push delivery.

use axum::{
	extract::{Path, Query, State},
	response::Json,
};
use fixline_types::{
	ApiError, DeviceTokenRequest, MarkAllReadResponse, Notification, NotificationListQuery,
	UnreadCountResponse, User,
};
use tracing::warn;
use uuid::Uuid;

use crate::apis::{map_storage_error, ActorContext};
use crate::server::AppState;

/// Handles GET /api/notifications requests.
///
/// Returns the caller's notifications, newest first, capped at the store
/// limit. `?unread=true` narrows the list to unread records.
pub async fn list_notifications(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Query(query): Query<NotificationListQuery>,
) -> Result<Json<Vec<Notification>>, ApiError> {
	match state
		.engine
		.notifications()
		.list_for_user(actor.user_id, query.unread)
		.await
	{
		Ok(notifications) => Ok(Json(notifications)),
		Err(e) => {
			warn!("Notification listing failed for user {}: {}", actor.user_id, e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles GET /api/notifications/unread-count requests.
pub async fn unread_count(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
) -> Result<Json<UnreadCountResponse>, ApiError> {
	match state.engine.notifications().count_unread(actor.user_id).await {
		Ok(count) => Ok(Json(UnreadCountResponse { count })),
		Err(e) => {
			warn!("Unread count failed for user {}: {}", actor.user_id, e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles POST /api/notifications/{id}/read requests.
///
/// Marking is idempotent. A notification belonging to another user is
/// reported as 404, the same as one that does not exist.
pub async fn mark_read(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Path(id): Path<Uuid>,
) -> Result<Json<Notification>, ApiError> {
	match state.engine.notifications().mark_read(actor.user_id, &id).await {
		Ok(notification) => Ok(Json(notification)),
		Err(e) => {
			warn!("Mark-read failed for notification {}: {}", id, e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles POST /api/notifications/read-all requests.
pub async fn mark_all_read(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
) -> Result<Json<MarkAllReadResponse>, ApiError> {
	match state.engine.notifications().mark_all_read(actor.user_id).await {
		Ok(updated) => Ok(Json(MarkAllReadResponse { updated })),
		Err(e) => {
			warn!("Mark-all-read failed for user {}: {}", actor.user_id, e);
			Err(map_storage_error(e))
		}
	}
}

/// Handles PUT /api/users/device-token requests.
///
/// Registers or replaces the caller's push device token. Tokens are
/// per-user; registering from a new device overwrites the previous one.
pub async fn register_device_token(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
	Json(request): Json<DeviceTokenRequest>,
) -> Result<Json<User>, ApiError> {
	match state
		.engine
		.directory()
		.set_device_token(actor.user_id, request.device_token)
		.await
	{
		Ok(user) => Ok(Json(user)),
		Err(e) => {
			warn!(
				"Device token registration failed for user {}: {}",
				actor.user_id, e
			);
			Err(map_storage_error(e))
		}
	}
}
