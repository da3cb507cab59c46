//! Character repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Attach named characters to a user partition.
//! - List the characters owned by one user.
//!
//! # Invariants
//! - Character names are stored trimmed.
//! - A name is unique inside its user partition; re-adding it is a conflict.
//! - Listing an unknown or empty user yields an empty list, not an error.

use crate::model::character::Character;
use crate::model::keys::{partition_key, EntityKey, EntityType};
use crate::repo::entity_table::{
    classify_insert_error, ensure_entity_connection_ready, now_millis, require_identifier,
    required_text, row_timestamp, RepoResult, ENTITY_SELECT_SQL,
};
use rusqlite::{params, Connection, Row};

/// Repository interface for user-owned characters.
pub trait CharacterRepository {
    /// Adds one character to a user and returns the stored record.
    fn add_character_to_user(&self, user_id: &str, character_name: &str)
        -> RepoResult<Character>;
    /// Lists characters of one user ordered by creation time.
    fn get_characters_for_user(&self, user_id: &str) -> RepoResult<Vec<Character>>;
}

/// SQLite-backed character repository.
pub struct SqliteCharacterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCharacterRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entity_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CharacterRepository for SqliteCharacterRepository<'_> {
    fn add_character_to_user(
        &self,
        user_id: &str,
        character_name: &str,
    ) -> RepoResult<Character> {
        let user_id = require_identifier(user_id, "userId")?;
        let name = require_identifier(character_name, "characterName")?;
        let key = EntityKey::character(&user_id, &name);
        let now = now_millis();

        self.conn
            .execute(
                "INSERT INTO entities (
                    pk,
                    sk,
                    entity_type,
                    user_id,
                    character_name,
                    created_at,
                    updated_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6);",
                params![
                    key.pk(),
                    key.sk(),
                    EntityType::Character.as_str(),
                    user_id.as_str(),
                    name.as_str(),
                    now.timestamp_millis(),
                ],
            )
            .map_err(|err| {
                classify_insert_error(err, || {
                    format!("character `{name}` already belongs to user {user_id}")
                })
            })?;

        Ok(Character {
            name,
            user_id,
            created_at: now,
            updated_at: now,
        })
    }

    fn get_characters_for_user(&self, user_id: &str) -> RepoResult<Vec<Character>> {
        let user_id = require_identifier(user_id, "userId")?;

        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE pk = ?1
               AND entity_type = ?2
             ORDER BY created_at ASC, sk ASC;"
        ))?;
        let mut rows = stmt.query(params![
            partition_key(&user_id),
            EntityType::Character.as_str()
        ])?;

        let mut characters = Vec::new();
        while let Some(row) = rows.next()? {
            characters.push(parse_character_row(row)?);
        }
        Ok(characters)
    }
}

pub(crate) fn parse_character_row(row: &Row<'_>) -> RepoResult<Character> {
    Ok(Character {
        name: required_text(row, "character_name")?,
        user_id: row.get("user_id")?,
        created_at: row_timestamp(row, "created_at")?,
        updated_at: row_timestamp(row, "updated_at")?,
    })
}
