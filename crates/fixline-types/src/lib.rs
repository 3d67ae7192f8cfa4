//! Common types module for the fixline system.
//!
//! This module defines the core data types and structures used throughout
//! the service-order engine. It provides a centralized location for shared
//! types to ensure consistency across all components.

/// Actor, role, and directory record types.
pub mod actor;
/// API types for HTTP endpoints and request/response structures.
pub mod api;
/// Equipment registry types.
pub mod equipment;
/// Event types for lifecycle fan-out.
pub mod events;
/// Notification record types.
pub mod notification;
/// Service-order types including statuses, categories, and payloads.
pub mod order;
/// Aggregate report types for the dashboard surface.
pub mod reports;
/// Storage types for managing persistent data.
pub mod storage;

// Re-export all types for convenient access
pub use actor::*;
pub use api::*;
pub use equipment::*;
pub use events::*;
pub use notification::*;
pub use order::*;
pub use reports::*;
pub use storage::*;
