//! Core lifecycle engine for the fixline service order system.
//!
//! This crate ties the pure state rules, the persistence repositories and
//! the notification fan-out together into the [`LifecycleEngine`], the
//! single write path for service orders. The API layer talks to the
//! engine; background consumers subscribe to its [`EventBus`].

pub mod dispatch;
pub mod engine;
pub mod repository;
pub mod state;

pub use dispatch::Dispatcher;
pub use engine::event_bus::EventBus;
pub use engine::{EngineError, LifecycleEngine};
pub use repository::{Directory, EquipmentRegistry, NotificationStore, OrderRepository};
pub use state::{check_transition, OrderStateError, TransitionOutcome};
