//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract for users, characters, goals and channels.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - All record kinds live in the single `entities` table under `(pk, sk)`.
//! - Repository APIs return semantic errors (`NotFound`, `Conflict`,
//!   `InvalidInput`) in addition to DB transport errors.
//! - Child writes do not check that the owning user row exists; the partition
//!   key is always derived from the caller-supplied user id.

pub mod character_repo;
pub mod entity_table;
pub mod goal_repo;
pub mod notification_channel_repo;
pub mod user_repo;
