//! User and technician directory.
//!
//! Identity itself is assigned upstream; this directory keeps the
//! projection the engine needs: roles for fan-out targeting, the
//! user<->technician link, and device tokens for push delivery.

use fixline_storage::{StorageError, StorageService};
use fixline_types::{Role, StorageKey, Technician, User};
use std::sync::Arc;

/// Repository for users and technicians.
pub struct Directory {
	storage: Arc<StorageService>,
}

impl Directory {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn upsert_user(&self, user: &User) -> Result<(), StorageError> {
		self.storage
			.store(StorageKey::Users.as_str(), &user.id.to_string(), user)
			.await
	}

	pub async fn get_user(&self, id: i64) -> Result<User, StorageError> {
		self.storage
			.retrieve(StorageKey::Users.as_str(), &id.to_string())
			.await
	}

	/// Lists all admin users, lowest id first.
	pub async fn list_admins(&self) -> Result<Vec<User>, StorageError> {
		let mut users: Vec<User> = self.storage.list(StorageKey::Users.as_str()).await?;
		users.retain(|u| u.role == Role::Admin);
		users.sort_by_key(|u| u.id);
		Ok(users)
	}

	/// Finds the user account linked to a technician, if any.
	pub async fn find_user_for_technician(
		&self,
		technician_id: i64,
	) -> Result<Option<User>, StorageError> {
		let users: Vec<User> = self.storage.list(StorageKey::Users.as_str()).await?;
		Ok(users
			.into_iter()
			.find(|u| u.technician_id == Some(technician_id)))
	}

	/// Records the push device token for a user.
	pub async fn set_device_token(
		&self,
		user_id: i64,
		device_token: String,
	) -> Result<User, StorageError> {
		let mut user: User = self
			.storage
			.retrieve(StorageKey::Users.as_str(), &user_id.to_string())
			.await?;
		user.device_token = Some(device_token);
		self.storage
			.update(StorageKey::Users.as_str(), &user_id.to_string(), &user)
			.await?;
		Ok(user)
	}

	pub async fn create_technician(&self, technician: &Technician) -> Result<(), StorageError> {
		self.storage
			.store(
				StorageKey::Technicians.as_str(),
				&technician.id.to_string(),
				technician,
			)
			.await
	}

	pub async fn get_technician(&self, id: i64) -> Result<Technician, StorageError> {
		self.storage
			.retrieve(StorageKey::Technicians.as_str(), &id.to_string())
			.await
	}

	pub async fn list_technicians(&self) -> Result<Vec<Technician>, StorageError> {
		let mut technicians: Vec<Technician> =
			self.storage.list(StorageKey::Technicians.as_str()).await?;
		technicians.sort_by_key(|t| t.id);
		Ok(technicians)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fixline_storage::implementations::memory::MemoryStorage;

	fn directory() -> Directory {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		Directory::new(storage)
	}

	fn user(id: i64, role: Role) -> User {
		User {
			id,
			username: format!("user{}", id),
			role,
			technician_id: None,
			device_token: None,
		}
	}

	#[tokio::test]
	async fn test_admin_listing_is_sorted() {
		let directory = directory();
		for u in [
			user(30, Role::Admin),
			user(1, Role::Admin),
			user(5, Role::Tenant),
			user(2, Role::Owner),
		] {
			directory.upsert_user(&u).await.unwrap();
		}

		let admins = directory.list_admins().await.unwrap();
		let ids: Vec<i64> = admins.iter().map(|u| u.id).collect();
		assert_eq!(ids, vec![1, 30]);
	}

	#[tokio::test]
	async fn test_technician_link_resolution() {
		let directory = directory();
		let mut linked = user(40, Role::Technician);
		linked.technician_id = Some(9);
		directory.upsert_user(&linked).await.unwrap();
		directory.upsert_user(&user(41, Role::Technician)).await.unwrap();

		let found = directory.find_user_for_technician(9).await.unwrap();
		assert_eq!(found.map(|u| u.id), Some(40));
		assert!(directory
			.find_user_for_technician(7)
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn test_device_token_update() {
		let directory = directory();
		directory.upsert_user(&user(5, Role::Tenant)).await.unwrap();

		let updated = directory
			.set_device_token(5, "token-abc".to_string())
			.await
			.unwrap();
		assert_eq!(updated.device_token.as_deref(), Some("token-abc"));

		let reloaded = directory.get_user(5).await.unwrap();
		assert_eq!(reloaded.device_token.as_deref(), Some("token-abc"));

		let missing = directory.set_device_token(99, "x".to_string()).await;
		assert!(matches!(missing, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_technician_roundtrip() {
		let directory = directory();
		let tech = Technician {
			id: 9,
			name: "Sam Rivera".to_string(),
			phone: Some("555-0100".to_string()),
			specialty: Some("industrial units".to_string()),
		};
		directory.create_technician(&tech).await.unwrap();

		assert_eq!(directory.get_technician(9).await.unwrap(), tech);
		assert!(matches!(
			directory.get_technician(7).await,
			Err(StorageError::NotFound)
		));

		let listed = directory.list_technicians().await.unwrap();
		assert_eq!(listed.len(), 1);
	}
}
