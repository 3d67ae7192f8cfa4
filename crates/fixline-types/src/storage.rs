//! Storage-related types for the fixline system.

use std::str::FromStr;

/// Storage keys for the persisted collections.
///
/// This enum provides type safety for storage operations by replacing
/// string literals with strongly typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
	/// Key for service-order records
	Orders,
	/// Key for per-recipient notification records
	Notifications,
	/// Key for user directory records
	Users,
	/// Key for technician directory records
	Technicians,
	/// Key for equipment registry records
	Equipment,
}

impl StorageKey {
	/// Returns the string representation of the storage key.
	pub fn as_str(&self) -> &'static str {
		match self {
			StorageKey::Orders => "orders",
			StorageKey::Notifications => "notifications",
			StorageKey::Users => "users",
			StorageKey::Technicians => "technicians",
			StorageKey::Equipment => "equipment",
		}
	}

	/// Returns an iterator over all StorageKey variants.
	pub fn all() -> impl Iterator<Item = Self> {
		[
			Self::Orders,
			Self::Notifications,
			Self::Users,
			Self::Technicians,
			Self::Equipment,
		]
		.into_iter()
	}
}

impl FromStr for StorageKey {
	type Err = ();

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"orders" => Ok(Self::Orders),
			"notifications" => Ok(Self::Notifications),
			"users" => Ok(Self::Users),
			"technicians" => Ok(Self::Technicians),
			"equipment" => Ok(Self::Equipment),
			_ => Err(()),
		}
	}
}

impl From<StorageKey> for &'static str {
	fn from(key: StorageKey) -> Self {
		key.as_str()
	}
}
