//! Notification record persistence.
//!
//! Records are the durable half of the fan-out: they are written before
//! any push delivery is attempted and survive push failures. All reads
//! are scoped to a recipient, so one user can never observe or mutate
//! another user's notifications.

use fixline_storage::{StorageError, StorageService};
use fixline_types::{Notification, StorageKey};
use std::sync::Arc;
use uuid::Uuid;

/// Upper bound for a single notification listing.
const LIST_LIMIT: usize = 50;

/// Repository for per-user notification records.
pub struct NotificationStore {
	storage: Arc<StorageService>,
}

impl NotificationStore {
	pub fn new(storage: Arc<StorageService>) -> Self {
		Self { storage }
	}

	pub async fn create(&self, notification: &Notification) -> Result<(), StorageError> {
		self.storage
			.store(
				StorageKey::Notifications.as_str(),
				&notification.id.to_string(),
				notification,
			)
			.await
	}

	/// Lists a user's notifications, newest first.
	///
	/// With `unread_only` set, read records are filtered out before the
	/// limit applies.
	pub async fn list_for_user(
		&self,
		user_id: i64,
		unread_only: bool,
	) -> Result<Vec<Notification>, StorageError> {
		let mut records: Vec<Notification> = self
			.storage
			.list(StorageKey::Notifications.as_str())
			.await?;
		records.retain(|n| n.user_id == user_id && (!unread_only || !n.read));
		records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		records.truncate(LIST_LIMIT);
		Ok(records)
	}

	pub async fn count_unread(&self, user_id: i64) -> Result<u64, StorageError> {
		let records: Vec<Notification> = self
			.storage
			.list(StorageKey::Notifications.as_str())
			.await?;
		Ok(records
			.iter()
			.filter(|n| n.user_id == user_id && !n.read)
			.count() as u64)
	}

	/// Marks one of the user's notifications as read.
	///
	/// A record belonging to someone else reports `NotFound`, the same
	/// as a record that does not exist.
	pub async fn mark_read(&self, user_id: i64, id: &Uuid) -> Result<Notification, StorageError> {
		let mut record: Notification = self
			.storage
			.retrieve(StorageKey::Notifications.as_str(), &id.to_string())
			.await?;
		if record.user_id != user_id {
			return Err(StorageError::NotFound);
		}
		record.read = true;
		self.storage
			.update(
				StorageKey::Notifications.as_str(),
				&id.to_string(),
				&record,
			)
			.await?;
		Ok(record)
	}

	/// Marks all of the user's unread notifications as read.
	///
	/// Returns how many records changed.
	pub async fn mark_all_read(&self, user_id: i64) -> Result<u64, StorageError> {
		let records: Vec<Notification> = self
			.storage
			.list(StorageKey::Notifications.as_str())
			.await?;
		let mut updated = 0u64;
		for mut record in records {
			if record.user_id != user_id || record.read {
				continue;
			}
			record.read = true;
			self.storage
				.update(
					StorageKey::Notifications.as_str(),
					&record.id.to_string(),
					&record,
				)
				.await?;
			updated += 1;
		}
		Ok(updated)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use fixline_storage::implementations::memory::MemoryStorage;
	use fixline_types::NotificationKind;

	fn store() -> NotificationStore {
		let storage = Arc::new(StorageService::new(Box::new(MemoryStorage::new())));
		NotificationStore::new(storage)
	}

	fn note(user_id: i64, title: &str) -> Notification {
		Notification::new(
			user_id,
			NotificationKind::OrderUpdated,
			title,
			"body",
			None,
		)
	}

	#[tokio::test]
	async fn test_listing_is_scoped_and_newest_first() {
		let store = store();
		let older = note(5, "older");
		// Force distinct timestamps so ordering is deterministic.
		let mut newer = note(5, "newer");
		newer.created_at = older.created_at + chrono::Duration::seconds(10);
		let foreign = note(6, "foreign");
		for n in [&older, &newer, &foreign] {
			store.create(n).await.unwrap();
		}

		let listed = store.list_for_user(5, false).await.unwrap();
		assert_eq!(listed.len(), 2);
		assert_eq!(listed[0].title, "newer");
		assert_eq!(listed[1].title, "older");
	}

	#[tokio::test]
	async fn test_unread_filter_and_count() {
		let store = store();
		let unread = note(5, "unread");
		let mut read = note(5, "read");
		read.read = true;
		store.create(&unread).await.unwrap();
		store.create(&read).await.unwrap();

		let listed = store.list_for_user(5, true).await.unwrap();
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].title, "unread");
		assert_eq!(store.count_unread(5).await.unwrap(), 1);
		assert_eq!(store.count_unread(6).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_mark_read_is_recipient_scoped() {
		let store = store();
		let mine = note(5, "mine");
		store.create(&mine).await.unwrap();

		// Another user cannot read-flag someone else's record.
		let foreign = store.mark_read(6, &mine.id).await;
		assert!(matches!(foreign, Err(StorageError::NotFound)));

		let updated = store.mark_read(5, &mine.id).await.unwrap();
		assert!(updated.read);
		assert_eq!(store.count_unread(5).await.unwrap(), 0);
	}

	#[tokio::test]
	async fn test_mark_all_read_reports_changed_count() {
		let store = store();
		for title in ["a", "b", "c"] {
			store.create(&note(5, title)).await.unwrap();
		}
		store.create(&note(6, "foreign")).await.unwrap();

		assert_eq!(store.mark_all_read(5).await.unwrap(), 3);
		// Second pass has nothing left to change.
		assert_eq!(store.mark_all_read(5).await.unwrap(), 0);
		assert_eq!(store.count_unread(6).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn test_listing_caps_at_limit() {
		let store = store();
		let base = note(5, "seed");
		for i in 0..60 {
			let mut n = note(5, &format!("n{}", i));
			n.created_at = base.created_at + chrono::Duration::seconds(i);
			store.create(&n).await.unwrap();
		}

		let listed = store.list_for_user(5, false).await.unwrap();
		assert_eq!(listed.len(), 50);
		// The newest record survives the cap.
		assert_eq!(listed[0].title, "n59");
	}
}
