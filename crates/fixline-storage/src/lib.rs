//! Storage module for the fixline system.
//!
//! This module provides abstractions for persistent storage of engine data,
//! supporting different backend implementations such as in-memory or
//! file-based storage. Writes that participate in the order lifecycle go
//! through compare-and-swap so concurrent transitions cannot lose updates.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

use implementations::{file::create_storage as create_file, memory::create_storage as create_memory};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs when a requested item is not found.
	#[error("Not found")]
	NotFound,
	/// Error that occurs when a guarded write loses a concurrent race.
	#[error("Conflict: value changed since it was read")]
	Conflict,
	/// Error that occurs during serialization/deserialization.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("Backend error: {0}")]
	Backend(String),
	/// Error that occurs during configuration validation.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

/// Trait defining the low-level interface for storage backends.
///
/// This trait must be implemented by any storage backend that wants to
/// integrate with the engine. It provides basic key-value operations plus
/// the compare-and-swap and namespace-scan primitives the lifecycle engine
/// and the role-scoped queries are built on.
#[async_trait]
pub trait StorageInterface: Send + Sync {
	/// Retrieves raw bytes for the given key.
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError>;

	/// Stores raw bytes, creating or overwriting the key.
	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

	/// Replaces the value only if the current bytes equal `expected`.
	///
	/// Returns `NotFound` when the key does not exist and `Conflict` when
	/// the stored bytes differ from `expected`.
	async fn compare_and_swap(
		&self,
		key: &str,
		expected: &[u8],
		value: Vec<u8>,
	) -> Result<(), StorageError>;

	/// Deletes the value associated with the given key.
	async fn delete(&self, key: &str) -> Result<(), StorageError>;

	/// Checks if a key exists in storage.
	async fn exists(&self, key: &str) -> Result<bool, StorageError>;

	/// Lists all `(id, bytes)` pairs under a namespace, in no defined order.
	async fn scan(&self, namespace: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError>;
}

/// Type alias for storage factory functions.
///
/// This is the function signature that all storage implementations provide
/// to create instances of their storage interface.
pub type StorageFactory = fn(&toml::Value) -> Result<Box<dyn StorageInterface>, StorageError>;

/// Creates a storage backend by its configuration name.
///
/// Recognized names are `memory` and `file`.
pub fn create_backend(
	name: &str,
	config: &toml::Value,
) -> Result<Box<dyn StorageInterface>, StorageError> {
	match name {
		"memory" => create_memory(config),
		"file" => create_file(config),
		other => Err(StorageError::Configuration(format!(
			"Unknown storage backend '{}'",
			other
		))),
	}
}

/// High-level storage service that provides typed operations.
///
/// The StorageService wraps a low-level storage backend and provides
/// convenient methods for storing and retrieving typed data with
/// automatic JSON serialization/deserialization. Keys are formed as
/// `namespace:id`.
pub struct StorageService {
	/// The underlying storage backend implementation.
	backend: Box<dyn StorageInterface>,
}

impl StorageService {
	/// Creates a new StorageService with the specified backend.
	pub fn new(backend: Box<dyn StorageInterface>) -> Self {
		Self { backend }
	}

	fn encode<T: Serialize>(data: &T) -> Result<Vec<u8>, StorageError> {
		serde_json::to_vec(data).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Stores a serializable value, creating or overwriting it.
	pub async fn store<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.set_bytes(&key, Self::encode(data)?).await
	}

	/// Retrieves and deserializes a value from storage.
	pub async fn retrieve<T: DeserializeOwned>(
		&self,
		namespace: &str,
		id: &str,
	) -> Result<T, StorageError> {
		let key = format!("{}:{}", namespace, id);
		let bytes = self.backend.get_bytes(&key).await?;
		serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization(e.to_string()))
	}

	/// Updates an existing value in storage.
	///
	/// This method first checks if the key exists, then overwrites the
	/// value. Returns an error if the key doesn't exist, making it
	/// semantically different from store() which will create or overwrite.
	pub async fn update<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		data: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);

		if !self.backend.exists(&key).await? {
			return Err(StorageError::NotFound);
		}

		self.backend.set_bytes(&key, Self::encode(data)?).await
	}

	/// Replaces a value only if it still serializes to what was read.
	///
	/// `expected` must be the snapshot the caller read before computing
	/// `updated`. A concurrent writer that got in between surfaces as
	/// `Conflict`, and the caller retries with fresh state.
	pub async fn update_guarded<T: Serialize>(
		&self,
		namespace: &str,
		id: &str,
		expected: &T,
		updated: &T,
	) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend
			.compare_and_swap(&key, &Self::encode(expected)?, Self::encode(updated)?)
			.await
	}

	/// Lists and deserializes every value in a namespace.
	///
	/// Ordering is backend-defined; callers sort by a record field.
	pub async fn list<T: DeserializeOwned>(&self, namespace: &str) -> Result<Vec<T>, StorageError> {
		let entries = self.backend.scan(namespace).await?;
		let mut items = Vec::with_capacity(entries.len());
		for (_, bytes) in entries {
			items.push(
				serde_json::from_slice(&bytes)
					.map_err(|e| StorageError::Serialization(e.to_string()))?,
			);
		}
		Ok(items)
	}

	/// Removes a value from storage.
	pub async fn remove(&self, namespace: &str, id: &str) -> Result<(), StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.delete(&key).await
	}

	/// Checks if a value exists in storage.
	pub async fn exists(&self, namespace: &str, id: &str) -> Result<bool, StorageError> {
		let key = format!("{}:{}", namespace, id);
		self.backend.exists(&key).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use implementations::memory::MemoryStorage;
	use serde::Deserialize;

	#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
	struct Record {
		id: String,
		count: u32,
	}

	fn service() -> StorageService {
		StorageService::new(Box::new(MemoryStorage::new()))
	}

	#[tokio::test]
	async fn test_typed_round_trip() {
		let storage = service();
		let rec = Record {
			id: "a".into(),
			count: 1,
		};
		storage.store("records", "a", &rec).await.unwrap();

		let loaded: Record = storage.retrieve("records", "a").await.unwrap();
		assert_eq!(loaded, rec);
	}

	#[tokio::test]
	async fn test_update_requires_existing_key() {
		let storage = service();
		let rec = Record {
			id: "a".into(),
			count: 1,
		};
		let result = storage.update("records", "a", &rec).await;
		assert!(matches!(result, Err(StorageError::NotFound)));
	}

	#[tokio::test]
	async fn test_update_guarded_detects_stale_snapshot() {
		let storage = service();
		let v1 = Record {
			id: "a".into(),
			count: 1,
		};
		let v2 = Record {
			id: "a".into(),
			count: 2,
		};
		let v3 = Record {
			id: "a".into(),
			count: 3,
		};
		storage.store("records", "a", &v1).await.unwrap();

		// First writer wins.
		storage
			.update_guarded("records", "a", &v1, &v2)
			.await
			.unwrap();

		// Second writer still holds the v1 snapshot and must lose.
		let result = storage.update_guarded("records", "a", &v1, &v3).await;
		assert!(matches!(result, Err(StorageError::Conflict)));

		let current: Record = storage.retrieve("records", "a").await.unwrap();
		assert_eq!(current, v2);
	}

	#[tokio::test]
	async fn test_list_namespace() {
		let storage = service();
		for i in 0..3u32 {
			let rec = Record {
				id: format!("r{}", i),
				count: i,
			};
			storage.store("records", &rec.id, &rec).await.unwrap();
		}
		storage
			.store("other", "x", &Record { id: "x".into(), count: 9 })
			.await
			.unwrap();

		let mut listed: Vec<Record> = storage.list("records").await.unwrap();
		listed.sort_by(|a, b| a.id.cmp(&b.id));
		assert_eq!(listed.len(), 3);
		assert_eq!(listed[2].count, 2);
	}

	#[test]
	fn test_create_backend_rejects_unknown_name() {
		let result = create_backend("redis", &toml::Value::Table(Default::default()));
		assert!(matches!(result, Err(StorageError::Configuration(_))));
	}
}
