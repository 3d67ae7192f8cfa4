//! HTTP API handlers for the fixline service.
//!
//! Each submodule implements one resource family of the REST surface. The
//! shared pieces live here: the `ActorContext` extractor that turns the
//! verified identity headers into an [`Actor`], and the mapping from engine
//! and storage errors onto [`ApiError`] responses.

pub mod directory;
pub mod equipment;
pub mod notifications;
pub mod orders;
pub mod reports;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use fixline_core::{EngineError, OrderStateError};
use fixline_storage::StorageError;
use fixline_types::{Actor, ApiError, Role};

/// Verified identity extracted from the gateway headers.
///
/// The upstream auth layer authenticates the caller and forwards the
/// identity as `x-user-id`, `x-user-role` and, for technician accounts,
/// `x-technician-id`. Requests without a parseable identity are rejected
/// with 401 before any handler runs.
pub struct ActorContext(pub Actor);

impl<S> FromRequestParts<S> for ActorContext
where
	S: Send + Sync,
{
	type Rejection = ApiError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let user_id = header_value(parts, "x-user-id")?
			.parse::<i64>()
			.map_err(|_| ApiError::Unauthorized("x-user-id header is not an integer".to_string()))?;
		let role = header_value(parts, "x-user-role")?.parse::<Role>().map_err(|_| {
			ApiError::Unauthorized("x-user-role header is not a known role".to_string())
		})?;
		let technician_id = match parts.headers.get("x-technician-id") {
			Some(value) => {
				let raw = value.to_str().map_err(|_| {
					ApiError::Unauthorized("x-technician-id header is not valid text".to_string())
				})?;
				Some(raw.parse::<i64>().map_err(|_| {
					ApiError::Unauthorized("x-technician-id header is not an integer".to_string())
				})?)
			}
			None => None,
		};

		Ok(ActorContext(Actor {
			user_id,
			role,
			technician_id,
		}))
	}
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, ApiError> {
	parts
		.headers
		.get(name)
		.and_then(|value| value.to_str().ok())
		.ok_or_else(|| ApiError::Unauthorized(format!("missing {} header", name)))
}

/// Maps engine failures onto the API error space.
pub fn map_engine_error(error: EngineError) -> ApiError {
	match error {
		EngineError::NotFound(id) => ApiError::NotFound(format!("order {} not found", id)),
		EngineError::State(OrderStateError::Forbidden { role, target }) => {
			ApiError::Forbidden(format!("role {} may not request {}", role, target))
		}
		EngineError::State(OrderStateError::InvalidTransition { from, to }) => {
			ApiError::UnprocessableEntity(format!("cannot transition from {} to {}", from, to))
		}
		EngineError::State(OrderStateError::Validation(message)) => ApiError::BadRequest(message),
		EngineError::Conflict => {
			ApiError::Conflict("order was modified concurrently, retry with fresh state".to_string())
		}
		EngineError::Storage(message) => ApiError::Internal(message),
	}
}

/// Maps storage failures from direct repository calls onto the API error space.
pub fn map_storage_error(error: StorageError) -> ApiError {
	match error {
		StorageError::NotFound => ApiError::NotFound("record not found".to_string()),
		StorageError::Conflict => ApiError::Conflict("record was modified concurrently".to_string()),
		other => ApiError::Internal(other.to_string()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fixline_core::EngineError;

	#[test]
	fn test_engine_error_mapping() {
		assert_eq!(
			map_engine_error(EngineError::NotFound("abc".into())).status_code(),
			404
		);
		assert_eq!(map_engine_error(EngineError::Conflict).status_code(), 409);
		assert_eq!(
			map_engine_error(EngineError::Storage("disk".into())).status_code(),
			500
		);
	}

	#[test]
	fn test_state_error_mapping() {
		use fixline_types::{OrderStatus, Role};

		let forbidden = EngineError::State(OrderStateError::Forbidden {
			role: Role::Tenant,
			target: OrderStatus::Approved,
		});
		assert_eq!(map_engine_error(forbidden).status_code(), 403);

		let invalid = EngineError::State(OrderStateError::InvalidTransition {
			from: OrderStatus::Completed,
			to: OrderStatus::Approved,
		});
		assert_eq!(map_engine_error(invalid).status_code(), 422);

		let validation =
			EngineError::State(OrderStateError::Validation("price is required".into()));
		assert_eq!(map_engine_error(validation).status_code(), 400);
	}

	#[test]
	fn test_storage_error_mapping() {
		assert_eq!(map_storage_error(StorageError::NotFound).status_code(), 404);
		assert_eq!(map_storage_error(StorageError::Conflict).status_code(), 409);
		assert_eq!(
			map_storage_error(StorageError::Backend("io".into())).status_code(),
			500
		);
	}
}
