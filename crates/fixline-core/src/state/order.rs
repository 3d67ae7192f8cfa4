//! Order transition rules.
//!
//! Manages service-order state transitions with validation, ensuring orders
//! move through valid lifecycle states: pending_owner -> approved ->
//! in_progress (alternating with on_the_way and waiting_spare) -> completed,
//! with cancelled reachable from any non-terminal state. Authorization,
//! legality and payload checks live here as pure functions so they are
//! testable in isolation from persistence.

use fixline_types::{Actor, OrderStatus, Role, ServiceOrder, TransitionPayload};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors that can occur during transition checking.
///
/// All variants are recoverable by the caller: they carry enough detail
/// to correct the request and retry.
#[derive(Debug, Error)]
pub enum OrderStateError {
	#[error("Invalid state transition from {from} to {to}")]
	InvalidTransition { from: OrderStatus, to: OrderStatus },
	#[error("Role {role} may not request {target}")]
	Forbidden { role: Role, target: OrderStatus },
	#[error("Validation failed: {0}")]
	Validation(String),
}

/// Verdict of a successful transition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
	/// The transition is valid and must be applied and announced.
	Apply,
	/// The order already sits in the requested status. Retried calls land
	/// here; the caller returns success without writing or emitting.
	Noop,
}

// Static transition table - each state maps to allowed next states
static TRANSITIONS: Lazy<HashMap<OrderStatus, HashSet<OrderStatus>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(
		OrderStatus::PendingOwner,
		HashSet::from([OrderStatus::Approved, OrderStatus::Cancelled]),
	);
	m.insert(
		OrderStatus::Approved,
		HashSet::from([
			OrderStatus::InProgress,
			OrderStatus::OnTheWay,
			OrderStatus::WaitingSpare,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		]),
	);
	m.insert(
		OrderStatus::InProgress,
		HashSet::from([
			OrderStatus::OnTheWay,
			OrderStatus::WaitingSpare,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		]),
	);
	m.insert(
		OrderStatus::OnTheWay,
		HashSet::from([
			OrderStatus::InProgress,
			OrderStatus::WaitingSpare,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		]),
	);
	m.insert(
		OrderStatus::WaitingSpare,
		HashSet::from([
			OrderStatus::InProgress,
			OrderStatus::OnTheWay,
			OrderStatus::Completed,
			OrderStatus::Cancelled,
		]),
	);
	m.insert(OrderStatus::Completed, HashSet::new()); // terminal
	m.insert(OrderStatus::Cancelled, HashSet::new()); // terminal
	m
});

// Roles allowed to request each target status. pending_owner is set at
// creation and never requestable, so its set is empty.
static TARGET_ROLES: Lazy<HashMap<OrderStatus, HashSet<Role>>> = Lazy::new(|| {
	let mut m = HashMap::new();
	m.insert(OrderStatus::PendingOwner, HashSet::new());
	m.insert(
		OrderStatus::Approved,
		HashSet::from([Role::Owner, Role::Admin]),
	);
	m.insert(OrderStatus::InProgress, HashSet::from([Role::Technician]));
	m.insert(OrderStatus::OnTheWay, HashSet::from([Role::Technician]));
	m.insert(OrderStatus::WaitingSpare, HashSet::from([Role::Technician]));
	m.insert(OrderStatus::Completed, HashSet::from([Role::Technician]));
	m.insert(
		OrderStatus::Cancelled,
		HashSet::from([Role::Technician, Role::Owner, Role::Admin]),
	);
	m
});

/// Checks a requested transition against the authorization and state rules.
///
/// Check order: actor authorization first, then the same-target retry
/// shortcut, then state legality, then payload validation. The retry
/// shortcut deliberately precedes the legality check so a retried
/// completion call against an already-completed order reports success
/// instead of InvalidTransition.
pub fn check_transition(
	order: &ServiceOrder,
	target: OrderStatus,
	actor: &Actor,
	payload: &TransitionPayload,
) -> Result<TransitionOutcome, OrderStateError> {
	let authorized = TARGET_ROLES
		.get(&target)
		.is_some_and(|roles| roles.contains(&actor.role));
	if !authorized {
		return Err(OrderStateError::Forbidden {
			role: actor.role,
			target,
		});
	}

	// Technicians only act on orders assigned to them.
	if actor.role == Role::Technician
		&& (order.technician_id.is_none() || order.technician_id != actor.technician_id)
	{
		return Err(OrderStateError::Forbidden {
			role: actor.role,
			target,
		});
	}

	if order.status == target {
		return Ok(TransitionOutcome::Noop);
	}

	let legal = TRANSITIONS
		.get(&order.status)
		.is_some_and(|targets| targets.contains(&target));
	if !legal {
		return Err(OrderStateError::InvalidTransition {
			from: order.status,
			to: target,
		});
	}

	validate_payload(target, payload)?;
	Ok(TransitionOutcome::Apply)
}

/// Validates the transition-specific payload fields for a target status.
fn validate_payload(
	target: OrderStatus,
	payload: &TransitionPayload,
) -> Result<(), OrderStateError> {
	match target {
		OrderStatus::Approved => {
			if payload.technician_id.is_none() {
				return Err(OrderStateError::Validation(
					"technician_id is required for approval".into(),
				));
			}
		},
		OrderStatus::Completed => match payload.total_price {
			None => {
				return Err(OrderStateError::Validation(
					"total_price is required to complete an order".into(),
				));
			},
			Some(price) if price < Decimal::ZERO => {
				return Err(OrderStateError::Validation(
					"total_price must be non-negative".into(),
				));
			},
			_ => {},
		},
		OrderStatus::Cancelled => {
			let reason_given = payload
				.cancellation_reason
				.as_deref()
				.is_some_and(|r| !r.trim().is_empty());
			if !reason_given {
				return Err(OrderStateError::Validation(
					"cancellation_reason is required to cancel an order".into(),
				));
			}
		},
		_ => {},
	}
	Ok(())
}

/// Produces the updated order snapshot for a validated transition.
///
/// Only fields relevant to the target status are taken from the payload;
/// everything else in the payload is ignored. The caller persists the
/// result conditioned on `order` being unchanged.
pub fn apply_transition(
	order: &ServiceOrder,
	target: OrderStatus,
	payload: &TransitionPayload,
) -> ServiceOrder {
	let mut updated = order.clone();
	updated.status = target;
	updated.updated_at = chrono::Utc::now();

	match target {
		OrderStatus::Approved => {
			updated.technician_id = payload.technician_id;
		},
		OrderStatus::InProgress | OrderStatus::OnTheWay => {
			apply_images(&mut updated, payload);
		},
		OrderStatus::WaitingSpare => {
			apply_images(&mut updated, payload);
			if let Some(name) = &payload.spare_part_name {
				updated.spare_part_name = Some(name.clone());
			}
			if let Some(eta) = payload.spare_part_eta {
				updated.spare_part_eta = Some(eta);
			}
		},
		OrderStatus::Completed => {
			apply_images(&mut updated, payload);
			updated.total_price = payload.total_price;
		},
		OrderStatus::Cancelled => {
			updated.cancellation_reason = payload.cancellation_reason.clone();
		},
		OrderStatus::PendingOwner => {},
	}

	updated
}

fn apply_images(order: &mut ServiceOrder, payload: &TransitionPayload) {
	if let Some(image) = &payload.before_image {
		order.before_image = Some(image.clone());
	}
	if let Some(image) = &payload.after_image {
		order.after_image = Some(image.clone());
	}
}
