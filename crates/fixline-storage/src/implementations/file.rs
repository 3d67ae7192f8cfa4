//! File-based storage backend implementation.
//!
//! Records are stored as binary files under one subdirectory per
//! namespace, so the key "orders:123" becomes "<base>/orders/123.bin".
//! Writes go through a temp-file-then-rename sequence, and an exclusive
//! lockfile keeps a second process from opening the same directory.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use fs2::FileExt;
use std::path::PathBuf;
use tokio::fs;
use tokio::sync::Mutex;

/// Fixed-size file header identifying the on-disk format.
///
/// Binary layout (5 bytes total):
/// - bytes 0-3: magic "FXLN"
/// - byte 4: format version
#[derive(Debug, Clone)]
struct FileHeader {
	magic: [u8; 4],
	version: u8,
}

impl FileHeader {
	const MAGIC: &'static [u8; 4] = b"FXLN";
	const VERSION: u8 = 1;
	const SIZE: usize = 5;

	fn new() -> Self {
		Self {
			magic: *Self::MAGIC,
			version: Self::VERSION,
		}
	}

	/// Serializes the header to bytes.
	fn serialize(&self) -> [u8; Self::SIZE] {
		let mut bytes = [0u8; Self::SIZE];
		bytes[0..4].copy_from_slice(&self.magic);
		bytes[4] = self.version;
		bytes
	}

	/// Deserializes a header from bytes.
	fn deserialize(bytes: &[u8]) -> Result<Self, StorageError> {
		if bytes.len() < Self::SIZE {
			return Err(StorageError::Backend("File too small for header".into()));
		}

		let mut magic = [0u8; 4];
		magic.copy_from_slice(&bytes[0..4]);
		if magic != *Self::MAGIC {
			return Err(StorageError::Backend("Unrecognized file format".into()));
		}

		let version = bytes[4];
		if version > Self::VERSION {
			return Err(StorageError::Backend(format!(
				"Unsupported file version: {}",
				version
			)));
		}

		Ok(Self { magic, version })
	}
}

/// File-based storage implementation.
///
/// This implementation stores data as binary files on the filesystem,
/// providing simple persistence without requiring external dependencies.
/// Compare-and-swap is serialized through an internal mutex, and the
/// lockfile held for the lifetime of the instance guarantees no other
/// process mutates the same directory.
pub struct FileStorage {
	/// Base directory path for storing files.
	base_path: PathBuf,
	/// Exclusive lock on the base directory, held until drop.
	_lockfile: std::fs::File,
	/// Serializes mutations so read-compare-write runs without interleaving.
	write_lock: Mutex<()>,
}

impl FileStorage {
	/// Opens a FileStorage rooted at the given directory.
	///
	/// Creates the directory if needed and takes an exclusive lock on it.
	/// Fails if another instance already holds the lock.
	pub fn open(base_path: PathBuf) -> Result<Self, StorageError> {
		std::fs::create_dir_all(&base_path).map_err(|e| StorageError::Backend(e.to_string()))?;

		let lock_path = base_path.join(".lock");
		let lockfile = std::fs::OpenOptions::new()
			.create(true)
			.truncate(false)
			.write(true)
			.open(&lock_path)
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		lockfile.try_lock_exclusive().map_err(|_| {
			StorageError::Backend(format!(
				"Storage directory {} is locked by another process",
				base_path.display()
			))
		})?;

		Ok(Self {
			base_path,
			_lockfile: lockfile,
			write_lock: Mutex::new(()),
		})
	}

	/// Converts a storage key to its file path, rejecting unsafe names.
	///
	/// Keys take the form "namespace:id" where both parts are limited to
	/// alphanumerics, underscores and hyphens, so the id can never escape
	/// the namespace directory.
	fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
		let (namespace, id) = key
			.split_once(':')
			.ok_or_else(|| StorageError::Backend(format!("Malformed storage key: {}", key)))?;
		validate_segment(namespace)?;
		validate_segment(id)?;
		Ok(self.base_path.join(namespace).join(format!("{}.bin", id)))
	}

	/// Reads a file and strips the header, mapping a missing file to NotFound.
	async fn read_payload(&self, path: &PathBuf) -> Result<Vec<u8>, StorageError> {
		let data = match fs::read(path).await {
			Ok(data) => data,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(StorageError::NotFound)
			},
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		FileHeader::deserialize(&data)?;
		Ok(data[FileHeader::SIZE..].to_vec())
	}

	/// Writes header plus payload atomically via a temp file rename.
	async fn write_payload(&self, path: &PathBuf, value: Vec<u8>) -> Result<(), StorageError> {
		if let Some(parent) = path.parent() {
			fs::create_dir_all(parent)
				.await
				.map_err(|e| StorageError::Backend(e.to_string()))?;
		}

		let header = FileHeader::new();
		let mut file_data = Vec::with_capacity(FileHeader::SIZE + value.len());
		file_data.extend_from_slice(&header.serialize());
		file_data.extend_from_slice(&value);

		let temp_path = path.with_extension("tmp");
		fs::write(&temp_path, file_data)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;
		fs::rename(&temp_path, path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		Ok(())
	}
}

/// Validates that a key segment contains only filesystem-safe characters.
fn validate_segment(segment: &str) -> Result<(), StorageError> {
	if segment.is_empty()
		|| !segment
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
	{
		return Err(StorageError::Backend(format!(
			"Invalid storage key segment: {}",
			segment
		)));
	}
	Ok(())
}

#[async_trait]
impl StorageInterface for FileStorage {
	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		let path = self.file_path(key)?;
		self.read_payload(&path).await
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		let path = self.file_path(key)?;
		let _guard = self.write_lock.lock().await;
		self.write_payload(&path, value).await
	}

	async fn compare_and_swap(
		&self,
		key: &str,
		expected: &[u8],
		value: Vec<u8>,
	) -> Result<(), StorageError> {
		let path = self.file_path(key)?;
		let _guard = self.write_lock.lock().await;

		let current = self.read_payload(&path).await?;
		if current.as_slice() != expected {
			return Err(StorageError::Conflict);
		}
		self.write_payload(&path, value).await
	}

	async fn delete(&self, key: &str) -> Result<(), StorageError> {
		let path = self.file_path(key)?;
		let _guard = self.write_lock.lock().await;

		match fs::remove_file(&path).await {
			Ok(_) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(StorageError::Backend(e.to_string())),
		}
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		let path = self.file_path(key)?;
		Ok(path.exists())
	}

	async fn scan(&self, namespace: &str) -> Result<Vec<(String, Vec<u8>)>, StorageError> {
		validate_segment(namespace)?;
		let dir = self.base_path.join(namespace);

		let mut entries = match fs::read_dir(&dir).await {
			Ok(entries) => entries,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
			Err(e) => return Err(StorageError::Backend(e.to_string())),
		};

		let mut results = Vec::new();
		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension() != Some(std::ffi::OsStr::new("bin")) {
				continue;
			}
			let Some(id) = path.file_stem().and_then(|s| s.to_str()) else {
				continue;
			};
			match self.read_payload(&path).await {
				Ok(payload) => results.push((id.to_string(), payload)),
				Err(e) => {
					tracing::debug!("Skipping file {:?} during scan: {}", path, e);
				},
			}
		}
		Ok(results)
	}
}

/// Factory function to create a file storage backend from configuration.
///
/// Configuration parameters:
/// - `path`: Base directory for file storage (default: "./data/storage")
pub fn create_storage(config: &toml::Value) -> Result<Box<dyn StorageInterface>, StorageError> {
	let path = config
		.get("path")
		.and_then(|v| v.as_str())
		.unwrap_or("./data/storage")
		.to_string();

	Ok(Box::new(FileStorage::open(PathBuf::from(path))?))
}
