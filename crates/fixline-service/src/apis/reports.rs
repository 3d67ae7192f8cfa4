//! Dashboard report endpoints.

use axum::{extract::State, response::Json};
use fixline_types::{ApiError, ReportStats, Role};
use tracing::warn;

use crate::apis::{map_engine_error, ActorContext};
use crate::server::AppState;

/// Handles GET /api/reports/stats requests.
///
/// Aggregates completed-order revenue and category distribution for the
/// dashboard. Restricted to owners and admins; the other roles have no
/// business view over revenue.
pub async fn get_stats(
	State(state): State<AppState>,
	ActorContext(actor): ActorContext,
) -> Result<Json<ReportStats>, ApiError> {
	if !matches!(actor.role, Role::Admin | Role::Owner) {
		return Err(ApiError::Forbidden(
			"reports are restricted to owners and admins".to_string(),
		));
	}
	match state.engine.report_stats().await {
		Ok(stats) => Ok(Json(stats)),
		Err(e) => {
			warn!("Report aggregation failed: {}", e);
			Err(map_engine_error(e))
		}
	}
}
