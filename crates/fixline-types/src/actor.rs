//! Actor and directory types.
//!
//! The engine never authenticates anyone; it receives a verified identity
//! triple from the upstream auth layer and applies role-based rules to it.
//! The directory records here back recipient resolution and role scoping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The four actor roles with distinct authorization scopes over orders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	/// Reports issues; sees only their own orders.
	Tenant,
	/// Approves pending orders; sees all orders.
	Owner,
	/// Executes assigned jobs; sees only their own assignments.
	Technician,
	/// Full visibility plus approval rights.
	Admin,
}

impl Role {
	pub fn as_str(&self) -> &'static str {
		match self {
			Role::Tenant => "tenant",
			Role::Owner => "owner",
			Role::Technician => "technician",
			Role::Admin => "admin",
		}
	}
}

impl fmt::Display for Role {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl FromStr for Role {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"tenant" => Ok(Self::Tenant),
			"owner" => Ok(Self::Owner),
			"technician" => Ok(Self::Technician),
			"admin" => Ok(Self::Admin),
			_ => Err(()),
		}
	}
}

/// Verified identity triple attached to every lifecycle call.
///
/// Supplied by the upstream auth layer; the engine trusts it and does not
/// re-authenticate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
	pub user_id: i64,
	pub role: Role,
	/// Linked technician id, present for technician-role actors.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub technician_id: Option<i64>,
}

impl Actor {
	pub fn new(user_id: i64, role: Role) -> Self {
		Self {
			user_id,
			role,
			technician_id: None,
		}
	}

	/// A technician-role actor with their directory link.
	pub fn technician(user_id: i64, technician_id: i64) -> Self {
		Self {
			user_id,
			role: Role::Technician,
			technician_id: Some(technician_id),
		}
	}
}

/// Directory record for a user account.
///
/// Ids are assigned by the upstream identity system, not by this service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
	pub id: i64,
	pub username: String,
	pub role: Role,
	/// Link to a technician record, for technician-role users.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub technician_id: Option<i64>,
	/// Push device token, absent until the user registers one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub device_token: Option<String>,
}

/// Directory record for a technician.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Technician {
	pub id: i64,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub phone: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub specialty: Option<String>,
}
