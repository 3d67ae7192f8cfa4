//! HTTP server for the fixline API.
//!
//! This module provides the HTTP server infrastructure for the service
//! order API: shared state, routing, and startup.

use axum::{
	routing::{get, post, put},
	Router,
};
use fixline_config::ApiConfig;
use fixline_core::LifecycleEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::{directory, equipment, notifications, orders, reports};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Reference to the lifecycle engine for processing requests.
	pub engine: Arc<LifecycleEngine>,
}

/// Builds the API router with all routes under the /api base path.
pub fn create_router(state: AppState) -> Router {
	Router::new()
		.nest(
			"/api",
			Router::new()
				.route("/orders", post(orders::create_order).get(orders::list_orders))
				.route("/orders/{id}", get(orders::get_order))
				.route("/orders/{id}/transition", post(orders::transition_order))
				.route("/orders/tracking/{code}", get(orders::get_order_by_tracking))
				.route("/reports/stats", get(reports::get_stats))
				.route("/notifications", get(notifications::list_notifications))
				.route(
					"/notifications/unread-count",
					get(notifications::unread_count),
				)
				.route("/notifications/{id}/read", post(notifications::mark_read))
				.route("/notifications/read-all", post(notifications::mark_all_read))
				.route("/users", post(directory::create_user))
				.route(
					"/users/device-token",
					put(notifications::register_device_token),
				)
				.route(
					"/technicians",
					post(directory::create_technician).get(directory::list_technicians),
				)
				.route(
					"/equipment",
					post(equipment::create_equipment).get(equipment::list_equipment),
				)
				.route("/equipment/{id}/status", put(equipment::set_equipment_status)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the API.
///
/// This function creates and configures the HTTP server with routing,
/// middleware, and error handling for the endpoints.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<LifecycleEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = create_router(AppState { engine });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("fixline API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}
