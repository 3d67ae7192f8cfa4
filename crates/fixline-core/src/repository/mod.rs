//! Typed persistence access for the engine's record kinds.
//!
//! Each repository wraps the shared [`StorageService`](fixline_storage::StorageService)
//! with the key layout and query shapes for one namespace. Repositories
//! return storage errors untranslated; the engine and API layers map them
//! to their own taxonomies.

pub mod directory;
pub mod equipment;
pub mod notification;
pub mod order;

pub use directory::Directory;
pub use equipment::EquipmentRegistry;
pub use notification::NotificationStore;
pub use order::{visible_to, OrderRepository};
