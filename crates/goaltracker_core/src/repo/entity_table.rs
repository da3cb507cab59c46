//! Shared access helpers for the single `entities` table.
//!
//! # Responsibility
//! - Define the repository error contract shared by every entity repository.
//! - Centralize identifier normalization, timestamp codecs and row decoding
//!   primitives for the sparse entity columns.
//! - Verify a connection is migrated before repositories use it.
//!
//! # Invariants
//! - Required identifiers are trimmed and rejected when blank, before any SQL.
//! - Primary-key collisions surface as `RepoError::Conflict`, not as DB errors.
//! - Timestamps are stored as epoch milliseconds; target dates as RFC 3339.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::goal::GoalValidationError;
use crate::model::keys::EntityType;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{ffi, Connection, Row};
use thiserror::Error;

pub(crate) const ENTITY_SELECT_SQL: &str = "SELECT
    pk,
    sk,
    entity_type,
    user_id,
    email,
    character_name,
    goal_id,
    target_attribute,
    target_type,
    target_value,
    target_date,
    notification_channel_type,
    frequency,
    current_value,
    channel_type,
    identifier,
    is_active,
    created_at,
    updated_at
FROM entities";

const ENTITY_TABLE: &str = "entities";
const REQUIRED_COLUMNS: &[&str] = &[
    "pk",
    "sk",
    "entity_type",
    "user_id",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by user, character, goal and channel persistence.
#[derive(Debug, Error)]
pub enum RepoError {
    /// Caller supplied a blank or malformed identifier.
    #[error("{0}")]
    InvalidInput(String),
    /// Goal candidate failed validation rules.
    #[error(transparent)]
    Validation(#[from] GoalValidationError),
    /// Requested record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    /// Record with the same composite key already exists.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Db(#[from] DbError),
    /// Persisted row cannot be decoded into a valid record.
    #[error("invalid persisted entity data: {0}")]
    InvalidData(String),
    /// Connection was not migrated to the schema this binary expects.
    #[error("entity repository requires schema version {expected_version}, got {actual_version}")]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Trims a required identifier, rejecting blank input.
pub(crate) fn require_identifier(value: &str, field: &'static str) -> RepoResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RepoError::InvalidInput(format!(
            "{field} cannot be null or empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Maps a primary-key violation on insert to `Conflict`. Every other failure,
/// including `CHECK` and `NOT NULL` violations, stays a `Db` error.
pub(crate) fn classify_insert_error(
    err: rusqlite::Error,
    conflict_message: impl FnOnce() -> String,
) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepoError::Conflict(conflict_message())
        }
        _ => err.into(),
    }
}

/// Current time truncated to the millisecond precision used in storage.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

pub(crate) fn timestamp_from_millis(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in entities.{column}"))
    })
}

pub(crate) fn date_to_text(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn date_from_text(value: &str, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| RepoError::InvalidData(format!("invalid date `{value}` in entities.{column}")))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

pub(crate) fn row_entity_type(row: &Row<'_>) -> RepoResult<EntityType> {
    let tag: String = row.get("entity_type")?;
    EntityType::parse(&tag)
        .ok_or_else(|| RepoError::InvalidData(format!("unknown entity type `{tag}`")))
}

pub(crate) fn required_text(row: &Row<'_>, column: &str) -> RepoResult<String> {
    row.get::<_, Option<String>>(column)?
        .ok_or_else(|| missing_column(row, column))
}

pub(crate) fn required_int(row: &Row<'_>, column: &str) -> RepoResult<i64> {
    row.get::<_, Option<i64>>(column)?
        .ok_or_else(|| missing_column(row, column))
}

pub(crate) fn row_timestamp(row: &Row<'_>, column: &str) -> RepoResult<DateTime<Utc>> {
    let value: i64 = row.get(column)?;
    timestamp_from_millis(value, column)
}

fn missing_column(row: &Row<'_>, column: &str) -> RepoError {
    let sk = row
        .get::<_, String>("sk")
        .unwrap_or_else(|_| "<unknown>".to_string());
    RepoError::InvalidData(format!("missing `{column}` for record `{sk}`"))
}

/// Checks that the connection carries the migrated entity schema.
pub(crate) fn ensure_entity_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({ENTITY_TABLE});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }

    for column in REQUIRED_COLUMNS {
        if !columns.iter().any(|current| current == column) {
            return Err(RepoError::InvalidData(format!(
                "table `{ENTITY_TABLE}` is missing column `{column}`"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{
        classify_insert_error, date_from_text, date_to_text, require_identifier, RepoError,
    };
    use crate::db::open_db_in_memory;
    use chrono::{TimeZone, Utc};

    const INSERT_USER_ROW: &str =
        "INSERT INTO entities (pk, sk, entity_type, user_id) VALUES ('USER#u1', 'METADATA', ?1, 'u1');";

    #[test]
    fn duplicate_key_is_a_conflict() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(INSERT_USER_ROW, ["USER"]).unwrap();

        let err = conn.execute(INSERT_USER_ROW, ["USER"]).unwrap_err();
        let classified = classify_insert_error(err, || "user already exists: u1".to_string());
        assert!(matches!(classified, RepoError::Conflict(ref message) if message.contains("u1")));
    }

    #[test]
    fn other_constraint_failures_stay_storage_errors() {
        let conn = open_db_in_memory().unwrap();

        let check_err = conn.execute(INSERT_USER_ROW, ["SESSION"]).unwrap_err();
        let classified = classify_insert_error(check_err, || "unexpected".to_string());
        assert!(matches!(classified, RepoError::Db(_)), "unexpected: {classified}");

        let not_null_err = conn
            .execute(
                "INSERT INTO entities (pk, sk, entity_type) VALUES ('USER#u1', 'METADATA', 'USER');",
                [],
            )
            .unwrap_err();
        let classified = classify_insert_error(not_null_err, || "unexpected".to_string());
        assert!(matches!(classified, RepoError::Db(_)), "unexpected: {classified}");
    }

    #[test]
    fn require_identifier_trims_and_rejects_blank() {
        assert_eq!(require_identifier("  u1 ", "userId").unwrap(), "u1");

        let err = require_identifier(" \t", "userId").unwrap_err();
        assert!(matches!(err, RepoError::InvalidInput(ref message) if message.contains("userId")));
    }

    #[test]
    fn target_dates_keep_sub_second_precision() {
        let date = Utc
            .timestamp_opt(1_760_000_000, 123_456_789)
            .single()
            .unwrap();
        let text = date_to_text(&date);
        assert_eq!(date_from_text(&text, "target_date").unwrap(), date);
    }

    #[test]
    fn invalid_date_text_is_reported_as_invalid_data() {
        let err = date_from_text("yesterday", "target_date").unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }
}
