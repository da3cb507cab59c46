//! Domain model for users, characters, goals and notification channels.
//!
//! # Responsibility
//! - Define canonical records used by core business logic.
//! - Define the composite key scheme shared by every persisted record.
//! - Own goal validation rules so every write path applies the same checks.
//!
//! # Invariants
//! - Every non-user record is owned by exactly one user id.
//! - Goals reference characters by name, not by foreign key.

pub mod character;
pub mod goal;
pub mod keys;
pub mod notification_channel;
pub mod user;
