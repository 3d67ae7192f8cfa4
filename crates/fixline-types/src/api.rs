//! API types for the fixline HTTP API.
//!
//! This module defines the request/response envelopes shared between the
//! HTTP layer and its clients, and the structured API error with its HTTP
//! status mapping.

use crate::equipment::EquipmentStatus;
use crate::order::{OrderStatus, TransitionPayload};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of a transition request.
///
/// The payload fields ride alongside the target status in a flat object,
/// e.g. `{"target": "completed", "total_price": "450"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRequest {
	/// Requested target status.
	pub target: OrderStatus,
	#[serde(flatten)]
	pub payload: TransitionPayload,
}

/// Body of a device-token registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceTokenRequest {
	#[serde(rename = "deviceToken")]
	pub device_token: String,
}

/// Body for registering an equipment unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEquipmentRequest {
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub location: Option<String>,
	/// Defaults to today when absent.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_service_date: Option<NaiveDate>,
}

/// Body for updating an equipment unit's stored status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentStatusRequest {
	pub status: EquipmentStatus,
}

/// Query parameters for the notification list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationListQuery {
	/// When true, only unread notifications are returned.
	#[serde(default)]
	pub unread: bool,
}

/// Response carrying an unread-notification count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
	pub count: u64,
}

/// Response for bulk mark-as-read operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
	/// Number of notifications flipped to read.
	pub updated: u64,
}

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
	/// Additional error context
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Missing or malformed request fields (400).
	BadRequest(String),
	/// Missing or unparseable identity headers (401).
	Unauthorized(String),
	/// Actor role does not permit the operation (403).
	Forbidden(String),
	/// No such record, or record outside the actor's scope (404).
	NotFound(String),
	/// Concurrent modification lost the race (409).
	Conflict(String),
	/// The order's current status does not permit the target (422).
	UnprocessableEntity(String),
	/// Unexpected failure; details are logged, never returned (500).
	Internal(String),
}

impl ApiError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			ApiError::BadRequest(_) => 400,
			ApiError::Unauthorized(_) => 401,
			ApiError::Forbidden(_) => 403,
			ApiError::NotFound(_) => 404,
			ApiError::Conflict(_) => 409,
			ApiError::UnprocessableEntity(_) => 422,
			ApiError::Internal(_) => 500,
		}
	}

	/// Stable machine-readable code for the error body.
	pub fn error_code(&self) -> &'static str {
		match self {
			ApiError::BadRequest(_) => "VALIDATION_FAILED",
			ApiError::Unauthorized(_) => "UNAUTHORIZED",
			ApiError::Forbidden(_) => "FORBIDDEN",
			ApiError::NotFound(_) => "NOT_FOUND",
			ApiError::Conflict(_) => "CONFLICT",
			ApiError::UnprocessableEntity(_) => "INVALID_TRANSITION",
			ApiError::Internal(_) => "INTERNAL_ERROR",
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	///
	/// Internal errors get a generic message; the detail stays in the logs.
	pub fn to_error_response(&self) -> ErrorResponse {
		let message = match self {
			ApiError::Internal(_) => "internal error".to_string(),
			ApiError::BadRequest(m)
			| ApiError::Unauthorized(m)
			| ApiError::Forbidden(m)
			| ApiError::NotFound(m)
			| ApiError::Conflict(m)
			| ApiError::UnprocessableEntity(m) => m.clone(),
		};
		ErrorResponse {
			error: self.error_code().to_string(),
			message,
			details: None,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ApiError::BadRequest(m) => write!(f, "Bad Request: {}", m),
			ApiError::Unauthorized(m) => write!(f, "Unauthorized: {}", m),
			ApiError::Forbidden(m) => write!(f, "Forbidden: {}", m),
			ApiError::NotFound(m) => write!(f, "Not Found: {}", m),
			ApiError::Conflict(m) => write!(f, "Conflict: {}", m),
			ApiError::UnprocessableEntity(m) => write!(f, "Unprocessable Entity: {}", m),
			ApiError::Internal(m) => write!(f, "Internal Server Error: {}", m),
		}
	}
}

impl std::error::Error for ApiError {}

impl axum::response::IntoResponse for ApiError {
	fn into_response(self) -> axum::response::Response {
		use axum::{http::StatusCode, response::Json};

		let status = StatusCode::from_u16(self.status_code())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		let error_response = self.to_error_response();
		(status, Json(error_response)).into_response()
	}
}
