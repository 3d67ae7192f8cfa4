//! State rules for service orders.
//!
//! This module provides the transition checker for the order lifecycle,
//! ensuring valid state changes, actor authorization and payload
//! completeness before anything is persisted.

pub mod order;

pub use order::{apply_transition, check_transition, OrderStateError, TransitionOutcome};
