//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository failures into the caller-facing error contract.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

pub mod character_service;
pub mod error;
pub mod goal_service;
pub mod notification_channel_service;
pub mod user_service;
