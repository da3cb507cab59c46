//! Goal repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Map goals to their storage entity shape and back.
//! - Persist goal metadata and the initial progress snapshot as one unit.
//! - Read goals back paired with their progress.
//!
//! # Invariants
//! - Metadata and progress rows are written in one immediate transaction;
//!   a failure on either insert leaves neither row behind.
//! - Write paths validate the goal before any SQL runs.
//! - Read paths reject a goal without progress (and vice versa) as
//!   `RepoError::InvalidData` instead of masking the inconsistency.

use crate::model::goal::{
    validate_goal, Goal, GoalId, GoalValidationError, ProgressSnapshot, TrackedGoal,
};
use crate::model::keys::{partition_key, EntityKey, EntityType};
use crate::repo::entity_table::{
    classify_insert_error, date_from_text, date_to_text, ensure_entity_connection_ready,
    now_millis, require_identifier, required_int, required_text, row_entity_type, row_timestamp,
    RepoError, RepoResult, ENTITY_SELECT_SQL,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use std::collections::HashMap;
use uuid::Uuid;

/// Storage shape of goal metadata.
///
/// Unlike `Goal`, the identifier and target date are mandatory here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalEntity {
    pub user_id: String,
    pub goal_id: GoalId,
    pub character_name: String,
    pub target_attribute: String,
    pub target_type: String,
    pub target_value: i64,
    pub target_date: DateTime<Utc>,
    pub notification_channel_type: String,
    pub frequency: String,
    /// Set by the repository on write.
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the repository on write.
    pub updated_at: Option<DateTime<Utc>>,
}

impl GoalEntity {
    /// Maps a domain goal into its storage entity.
    ///
    /// Assigns a fresh goal id when the goal has none yet. Every other field
    /// is copied verbatim.
    pub fn from_goal(goal: &Goal) -> Result<Self, GoalValidationError> {
        let target_date = goal
            .target_date
            .ok_or(GoalValidationError::MissingTargetDate)?;

        Ok(Self {
            user_id: goal.user_id.clone(),
            goal_id: goal.goal_id.unwrap_or_else(Uuid::new_v4),
            character_name: goal.character_name.clone(),
            target_attribute: goal.target_attribute.clone(),
            target_type: goal.target_type.clone(),
            target_value: goal.target_value,
            target_date,
            notification_channel_type: goal.notification_channel_type.clone(),
            frequency: goal.frequency.clone(),
            created_at: goal.created_at,
            updated_at: goal.updated_at,
        })
    }

    /// Maps the storage entity back into the domain goal.
    pub fn into_goal(self) -> Goal {
        Goal {
            user_id: self.user_id,
            goal_id: Some(self.goal_id),
            character_name: self.character_name,
            target_attribute: self.target_attribute,
            target_type: self.target_type,
            target_value: self.target_value,
            target_date: Some(self.target_date),
            notification_channel_type: self.notification_channel_type,
            frequency: self.frequency,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Applies the goal validation rules to this entity.
    pub fn validate(&self, current_progress: i64) -> Result<(), GoalValidationError> {
        validate_goal(Some(&self.clone().into_goal()), current_progress)
    }

    /// Key of the metadata row. The partition uses the trimmed user id.
    pub fn metadata_key(&self) -> EntityKey {
        EntityKey::goal(self.user_id.trim(), &self.goal_id.to_string())
    }

    /// Key of the progress row paired with this goal.
    pub fn progress_key(&self) -> EntityKey {
        EntityKey::progress(self.user_id.trim(), &self.goal_id.to_string())
    }
}

/// Goal metadata entity paired with its persisted progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalRecord {
    pub metadata: GoalEntity,
    pub progress: ProgressSnapshot,
}

impl From<GoalRecord> for TrackedGoal {
    fn from(value: GoalRecord) -> Self {
        Self {
            goal: value.metadata.into_goal(),
            progress: value.progress,
        }
    }
}

/// Repository interface for goals and their progress snapshots.
pub trait GoalRepository {
    /// Persists metadata and initial progress; both or neither are stored.
    fn create_goal(&self, goal: &GoalEntity, current_progress: i64) -> RepoResult<GoalRecord>;
    /// Gets one goal of a user by id.
    fn get_goal(&self, user_id: &str, goal_id: GoalId) -> RepoResult<Option<GoalRecord>>;
    /// Lists goals of one user ordered by creation time.
    fn get_goals_for_user(&self, user_id: &str) -> RepoResult<Vec<GoalRecord>>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_entity_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, goal: &GoalEntity, current_progress: i64) -> RepoResult<GoalRecord> {
        goal.validate(current_progress)?;

        let now = now_millis();
        let mut metadata = goal.clone();
        metadata.created_at = Some(now);
        metadata.updated_at = Some(now);
        let progress = ProgressSnapshot {
            goal_id: goal.goal_id,
            user_id: goal.user_id.clone(),
            current_value: current_progress,
            captured_at: now,
        };

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        insert_goal_metadata(&tx, &metadata, now)?;
        insert_goal_progress(&tx, &metadata, current_progress, now)?;
        tx.commit()?;

        Ok(GoalRecord { metadata, progress })
    }

    fn get_goal(&self, user_id: &str, goal_id: GoalId) -> RepoResult<Option<GoalRecord>> {
        let user_id = require_identifier(user_id, "userId")?;
        let goal_id_text = goal_id.to_string();
        let metadata_key = EntityKey::goal(&user_id, &goal_id_text);
        let progress_key = EntityKey::progress(&user_id, &goal_id_text);

        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE pk = ?1
               AND sk IN (?2, ?3);"
        ))?;
        let mut rows = stmt.query(params![
            metadata_key.pk(),
            metadata_key.sk(),
            progress_key.sk()
        ])?;

        let (goals, progress) = collect_goal_rows(&mut rows)?;
        if goals.is_empty() && progress.is_empty() {
            return Ok(None);
        }
        Ok(pair_goal_records(goals, progress)?.into_iter().next())
    }

    fn get_goals_for_user(&self, user_id: &str) -> RepoResult<Vec<GoalRecord>> {
        let user_id = require_identifier(user_id, "userId")?;

        let mut stmt = self.conn.prepare(&format!(
            "{ENTITY_SELECT_SQL}
             WHERE pk = ?1
               AND entity_type IN (?2, ?3)
             ORDER BY created_at ASC, sk ASC;"
        ))?;
        let mut rows = stmt.query(params![
            partition_key(&user_id),
            EntityType::Goal.as_str(),
            EntityType::Progress.as_str()
        ])?;

        let (goals, progress) = collect_goal_rows(&mut rows)?;
        pair_goal_records(goals, progress)
    }
}

fn insert_goal_metadata(
    tx: &Transaction<'_>,
    goal: &GoalEntity,
    now: DateTime<Utc>,
) -> RepoResult<()> {
    let key = goal.metadata_key();
    tx.execute(
        "INSERT INTO entities (
            pk,
            sk,
            entity_type,
            user_id,
            character_name,
            goal_id,
            target_attribute,
            target_type,
            target_value,
            target_date,
            notification_channel_type,
            frequency,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13);",
        params![
            key.pk(),
            key.sk(),
            EntityType::Goal.as_str(),
            goal.user_id.as_str(),
            goal.character_name.as_str(),
            goal.goal_id.to_string(),
            goal.target_attribute.as_str(),
            goal.target_type.as_str(),
            goal.target_value,
            date_to_text(&goal.target_date),
            goal.notification_channel_type.as_str(),
            goal.frequency.as_str(),
            now.timestamp_millis(),
        ],
    )
    .map_err(|err| {
        classify_insert_error(err, || format!("goal already exists: {}", goal.goal_id))
    })?;
    Ok(())
}

fn insert_goal_progress(
    tx: &Transaction<'_>,
    goal: &GoalEntity,
    current_progress: i64,
    now: DateTime<Utc>,
) -> RepoResult<()> {
    let key = goal.progress_key();
    tx.execute(
        "INSERT INTO entities (
            pk,
            sk,
            entity_type,
            user_id,
            goal_id,
            current_value,
            created_at,
            updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7);",
        params![
            key.pk(),
            key.sk(),
            EntityType::Progress.as_str(),
            goal.user_id.as_str(),
            goal.goal_id.to_string(),
            current_progress,
            now.timestamp_millis(),
        ],
    )
    .map_err(|err| {
        classify_insert_error(err, || {
            format!("goal progress already exists: {}", goal.goal_id)
        })
    })?;
    Ok(())
}

fn collect_goal_rows(
    rows: &mut rusqlite::Rows<'_>,
) -> RepoResult<(Vec<GoalEntity>, Vec<ProgressSnapshot>)> {
    let mut goals = Vec::new();
    let mut progress = Vec::new();
    while let Some(row) = rows.next()? {
        match row_entity_type(row)? {
            EntityType::Goal => goals.push(parse_goal_row(row)?),
            EntityType::Progress => progress.push(parse_progress_row(row)?),
            other => {
                return Err(RepoError::InvalidData(format!(
                    "unexpected {other} record in goal query"
                )));
            }
        }
    }
    Ok((goals, progress))
}

/// Pairs goal metadata with progress rows by goal id, keeping goal order.
pub(crate) fn pair_goal_records(
    goals: Vec<GoalEntity>,
    progress: Vec<ProgressSnapshot>,
) -> RepoResult<Vec<GoalRecord>> {
    let mut by_goal: HashMap<GoalId, ProgressSnapshot> = progress
        .into_iter()
        .map(|snapshot| (snapshot.goal_id, snapshot))
        .collect();

    let mut records = Vec::with_capacity(goals.len());
    for metadata in goals {
        let progress = by_goal.remove(&metadata.goal_id).ok_or_else(|| {
            RepoError::InvalidData(format!("goal {} has no progress record", metadata.goal_id))
        })?;
        records.push(GoalRecord { metadata, progress });
    }

    if let Some(orphan) = by_goal.keys().next() {
        return Err(RepoError::InvalidData(format!(
            "progress record {orphan} has no goal metadata"
        )));
    }

    Ok(records)
}

pub(crate) fn parse_goal_row(row: &Row<'_>) -> RepoResult<GoalEntity> {
    let target_date_text = required_text(row, "target_date")?;

    Ok(GoalEntity {
        user_id: row.get("user_id")?,
        goal_id: parse_goal_id(row)?,
        character_name: required_text(row, "character_name")?,
        target_attribute: required_text(row, "target_attribute")?,
        target_type: required_text(row, "target_type")?,
        target_value: required_int(row, "target_value")?,
        target_date: date_from_text(&target_date_text, "target_date")?,
        notification_channel_type: required_text(row, "notification_channel_type")?,
        frequency: required_text(row, "frequency")?,
        created_at: Some(row_timestamp(row, "created_at")?),
        updated_at: Some(row_timestamp(row, "updated_at")?),
    })
}

pub(crate) fn parse_progress_row(row: &Row<'_>) -> RepoResult<ProgressSnapshot> {
    Ok(ProgressSnapshot {
        goal_id: parse_goal_id(row)?,
        user_id: row.get("user_id")?,
        current_value: required_int(row, "current_value")?,
        captured_at: row_timestamp(row, "created_at")?,
    })
}

fn parse_goal_id(row: &Row<'_>) -> RepoResult<GoalId> {
    let text = required_text(row, "goal_id")?;
    Uuid::parse_str(&text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{text}` in entities.goal_id"))
    })
}
