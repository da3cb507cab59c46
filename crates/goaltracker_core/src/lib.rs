//! Core domain logic for the goal tracker.
//! This crate is the single source of truth for goal, user, character and
//! notification channel invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod tracker;

pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::character::Character;
pub use model::goal::{
    validate_goal, Goal, GoalId, GoalValidationError, ProgressSnapshot, TrackedGoal,
};
pub use model::keys::{EntityKey, EntityType};
pub use model::notification_channel::NotificationChannel;
pub use model::user::{User, UserAggregate, UserId};
pub use repo::character_repo::{CharacterRepository, SqliteCharacterRepository};
pub use repo::entity_table::{RepoError, RepoResult};
pub use repo::goal_repo::{GoalEntity, GoalRecord, GoalRepository, SqliteGoalRepository};
pub use repo::notification_channel_repo::{
    NotificationChannelRepository, SqliteNotificationChannelRepository,
};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::character_service::CharacterService;
pub use service::error::{ServiceError, ServiceResult};
pub use service::goal_service::GoalService;
pub use service::notification_channel_service::NotificationChannelService;
pub use service::user_service::UserService;
pub use tracker::GoalTracker;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
