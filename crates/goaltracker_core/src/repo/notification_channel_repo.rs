//! Notification channel repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `channel_type` and `identifier` are required and stored trimmed.
//! - `channel_type` never contains the `#` key separator, so the identifier
//!   (which may) is always the unambiguous tail of the sort key.
//! - One user cannot register the same `(channel_type, identifier)` twice.

use crate::model::keys::{partition_key, EntityKey, EntityType, KEY_SEPARATOR};
use crate::model::notification_channel::NotificationChannel;
use crate::repo::entity_table::{
    bool_to_int, classify_insert_error, ensure_entity_connection_ready, now_millis,
    require_identifier, required_int, required_text, row_timestamp, RepoError, RepoResult,
    ENTITY_SELECT_SQL,
};
use rusqlite::{params, Connection, Row};

/// Repository interface for user notification channels.
pub trait NotificationChannelRepository {
    fn create_notification_channel(
        &self,
        user_id: &str,
        channel_type: &str,
        identifier: &str,
        is_active: bool,
    ) -> RepoResult<NotificationChannel>;
    fn get_notification_channels(&self, user_id: &str) -> RepoResult<Vec<NotificationChannel>>;
}

/// SQLite-backed notification channel repository.
pub struct SqliteNotificationChannelRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNotificationChannelRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entity_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NotificationChannelRepository for SqliteNotificationChannelRepository<'_> {
    fn create_notification_channel(
        &self,
        user_id: &str,
        channel_type: &str,
        identifier: &str,
        is_active: bool,
    ) -> RepoResult<NotificationChannel> {
        let user_id = require_identifier(user_id, "userId")?;
        let channel_type = require_identifier(channel_type, "channelType")?;
        if channel_type.contains(KEY_SEPARATOR) {
            return Err(RepoError::InvalidInput(format!(
                "channelType cannot contain `{KEY_SEPARATOR}`"
            )));
        }
        let identifier = require_identifier(identifier, "identifier")?;
        let key = EntityKey::notification_channel(&user_id, &channel_type, &identifier);
        let now = now_millis();

        self.conn
            .execute(
                "INSERT INTO entities (
                    pk,
                    sk,
                    entity_type,
                    user_id,
                    channel_type,
                    identifier,
                    is_active,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8);",
                params![
                    key.pk(),
                    key.sk(),
                    EntityType::NotificationChannel.as_str(),
                    user_id.as_str(),
                    channel_type.as_str(),
                    identifier.as_str(),
                    bool_to_int(is_active),
                    now.timestamp_millis(),
                ],
            )
            .map_err(|err| {
                classify_insert_error(err, || {
                    format!(
                        "{channel_type} notification channel already registered for user {user_id}"
                    )
                })
            })?;

        Ok(NotificationChannel {
            user_id,
            channel_type,
            identifier,
            is_active,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_notification_channels(&self, user_id: &str) -> RepoResult<Vec<NotificationChannel>> {
        let user_id = require_identifier(user_id, "userId")?;

        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE pk = ?1
               AND entity_type = ?2
             ORDER BY created_at ASC, sk ASC;"
        ))?;
        let mut rows = stmt.query(params![
            partition_key(&user_id),
            EntityType::NotificationChannel.as_str()
        ])?;

        let mut channels = Vec::new();
        while let Some(row) = rows.next()? {
            channels.push(parse_channel_row(row)?);
        }
        Ok(channels)
    }
}

pub(crate) fn parse_channel_row(row: &Row<'_>) -> RepoResult<NotificationChannel> {
    let is_active = match required_int(row, "is_active")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_active value `{other}` in entities.is_active"
            )));
        }
    };

    Ok(NotificationChannel {
        user_id: row.get("user_id")?,
        channel_type: required_text(row, "channel_type")?,
        identifier: required_text(row, "identifier")?,
        is_active,
        created_at: row_timestamp(row, "created_at")?,
        updated_at: row_timestamp(row, "updated_at")?,
    })
}
