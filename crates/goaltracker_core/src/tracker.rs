//! Composition root for the core object graph.
//!
//! # Responsibility
//! - Build every repository and service from one migrated connection.
//!
//! # Invariants
//! - All services share the same connection, so a caller observes its own
//!   writes across services immediately.

use crate::repo::character_repo::SqliteCharacterRepository;
use crate::repo::entity_table::RepoResult;
use crate::repo::goal_repo::SqliteGoalRepository;
use crate::repo::notification_channel_repo::SqliteNotificationChannelRepository;
use crate::repo::user_repo::SqliteUserRepository;
use crate::service::character_service::CharacterService;
use crate::service::goal_service::GoalService;
use crate::service::notification_channel_service::NotificationChannelService;
use crate::service::user_service::UserService;
use rusqlite::Connection;

/// Fully wired set of core services over one SQLite connection.
pub struct GoalTracker<'conn> {
    pub users: UserService<SqliteUserRepository<'conn>>,
    pub characters: CharacterService<SqliteCharacterRepository<'conn>>,
    pub goals: GoalService<SqliteGoalRepository<'conn>>,
    pub notification_channels:
        NotificationChannelService<SqliteNotificationChannelRepository<'conn>>,
}

impl<'conn> GoalTracker<'conn> {
    /// Wires repositories and services over a migrated connection.
    ///
    /// Fails when the connection does not carry the expected schema.
    pub fn compose(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            users: UserService::new(SqliteUserRepository::try_new(conn)?),
            characters: CharacterService::new(SqliteCharacterRepository::try_new(conn)?),
            goals: GoalService::new(SqliteGoalRepository::try_new(conn)?),
            notification_channels: NotificationChannelService::new(
                SqliteNotificationChannelRepository::try_new(conn)?,
            ),
        })
    }
}
