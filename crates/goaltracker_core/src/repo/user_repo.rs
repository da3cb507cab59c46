//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create and read user records in the shared entity table.
//! - Load a full user aggregate with one partition range query.
//!
//! # Invariants
//! - User ids are generated here and never supplied by callers.
//! - `get_user` and `load_user_aggregate` report a missing user as
//!   `RepoError::NotFound`, never as an empty value.

use crate::model::keys::{partition_key, EntityKey, EntityType};
use crate::model::user::{User, UserAggregate};
use crate::repo::character_repo::parse_character_row;
use crate::repo::entity_table::{
    classify_insert_error, ensure_entity_connection_ready, now_millis, require_identifier,
    required_text, row_entity_type, row_timestamp, RepoError, RepoResult, ENTITY_SELECT_SQL,
};
use crate::repo::goal_repo::{pair_goal_records, parse_goal_row, parse_progress_row};
use crate::repo::notification_channel_repo::parse_channel_row;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

/// Repository interface for user accounts.
pub trait UserRepository {
    /// Creates a user with a generated id and the trimmed email.
    fn create_user(&self, email: &str) -> RepoResult<User>;
    /// Gets one user by id.
    fn get_user(&self, user_id: &str) -> RepoResult<User>;
    /// Loads the user and every child record stored in its partition.
    fn load_user_aggregate(&self, user_id: &str) -> RepoResult<UserAggregate>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entity_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, email: &str) -> RepoResult<User> {
        let email = require_identifier(email, "email")?;
        let user_id = Uuid::new_v4().to_string();
        let key = EntityKey::user(&user_id);
        let now = now_millis();

        self.conn
            .execute(
                "INSERT INTO entities (
                    pk,
                    sk,
                    entity_type,
                    user_id,
                    email,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
                params![
                    key.pk(),
                    key.sk(),
                    EntityType::User.as_str(),
                    user_id.as_str(),
                    email.as_str(),
                    now.timestamp_millis(),
                ],
            )
            .map_err(|err| {
                classify_insert_error(err, || format!("user already exists: {user_id}"))
            })?;

        Ok(User {
            user_id,
            email,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_user(&self, user_id: &str) -> RepoResult<User> {
        let user_id = require_identifier(user_id, "userId")?;
        let key = EntityKey::user(&user_id);

        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE pk = ?1
               AND sk = ?2;"
        ))?;
        let mut rows = stmt.query(params![key.pk(), key.sk()])?;
        match rows.next()? {
            Some(row) => parse_user_row(row),
            None => Err(RepoError::not_found("user", user_id)),
        }
    }

    fn load_user_aggregate(&self, user_id: &str) -> RepoResult<UserAggregate> {
        let user_id = require_identifier(user_id, "userId")?;

        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE pk = ?1
             ORDER BY created_at ASC, sk ASC;"
        ))?;
        let mut rows = stmt.query([partition_key(&user_id)])?;

        let mut user = None;
        let mut characters = Vec::new();
        let mut goals = Vec::new();
        let mut progress = Vec::new();
        let mut notification_channels = Vec::new();

        while let Some(row) = rows.next()? {
            match row_entity_type(row)? {
                EntityType::User => user = Some(parse_user_row(row)?),
                EntityType::Character => characters.push(parse_character_row(row)?),
                EntityType::Goal => goals.push(parse_goal_row(row)?),
                EntityType::Progress => progress.push(parse_progress_row(row)?),
                EntityType::NotificationChannel => {
                    notification_channels.push(parse_channel_row(row)?)
                }
            }
        }

        let user = user.ok_or_else(|| RepoError::not_found("user", user_id.as_str()))?;
        let goals = pair_goal_records(goals, progress)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(UserAggregate {
            user,
            characters,
            goals,
            notification_channels,
        })
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    Ok(User {
        user_id: row.get("user_id")?,
        email: required_text(row, "email")?,
        created_at: row_timestamp(row, "created_at")?,
        updated_at: row_timestamp(row, "updated_at")?,
    })
}
