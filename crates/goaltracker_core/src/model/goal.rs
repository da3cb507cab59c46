//! Goal domain model and validation rules.
//!
//! # Responsibility
//! - Define the goal record and its companion progress snapshot.
//! - Provide the fail-fast validation applied before any goal write.
//!
//! # Invariants
//! - A goal is either fully valid or rejected; there is no warning state.
//! - Validation order is fixed: presence, required text fields, target value,
//!   current progress, target date. The first violation wins.
//! - `target_date` is not required to lie in the future.

use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Server-assigned goal identifier.
pub type GoalId = Uuid;

/// Target a user wants one of their characters to reach.
///
/// `character_name` is a denormalized copy of the character name; renaming a
/// character does not rewrite goals that already reference it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Goal {
    pub user_id: UserId,
    /// `None` until the goal has been persisted.
    pub goal_id: Option<GoalId>,
    pub character_name: String,
    /// Skill or activity name, e.g. `WOODCUTTING`.
    pub target_attribute: String,
    /// Unit of `target_value`, e.g. `xp` or `level`.
    pub target_type: String,
    pub target_value: i64,
    pub target_date: Option<DateTime<Utc>>,
    pub notification_channel_type: String,
    /// How often progress should be reported, e.g. `DAILY`.
    pub frequency: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Measured progress toward a goal, captured when the goal was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub goal_id: GoalId,
    pub user_id: UserId,
    pub current_value: i64,
    pub captured_at: DateTime<Utc>,
}

/// Goal metadata paired with its progress snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedGoal {
    pub goal: Goal,
    pub progress: ProgressSnapshot,
}

/// Rejection reasons for a goal creation candidate.
///
/// Messages name the offending field using its wire name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoalValidationError {
    #[error("goal cannot be null")]
    MissingGoal,
    #[error("{0} cannot be null or empty")]
    BlankField(&'static str),
    #[error("targetValue must be greater than 0")]
    NonPositiveTargetValue(i64),
    #[error("currentProgress cannot be negative")]
    NegativeCurrentProgress(i64),
    #[error("targetDate cannot be null")]
    MissingTargetDate,
}

impl GoalValidationError {
    /// Wire name of the field that failed validation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingGoal => "goal",
            Self::BlankField(field) => field,
            Self::NonPositiveTargetValue(_) => "targetValue",
            Self::NegativeCurrentProgress(_) => "currentProgress",
            Self::MissingTargetDate => "targetDate",
        }
    }
}

/// Validates a goal candidate together with its initial progress value.
///
/// Accepts `None` so callers that decode optional input can report an absent
/// goal through the same rule set.
pub fn validate_goal(
    goal: Option<&Goal>,
    current_progress: i64,
) -> Result<(), GoalValidationError> {
    let goal = goal.ok_or(GoalValidationError::MissingGoal)?;

    require_text(&goal.user_id, "userId")?;
    require_text(&goal.character_name, "characterName")?;
    require_text(&goal.target_attribute, "targetAttribute")?;

    if goal.target_value <= 0 {
        return Err(GoalValidationError::NonPositiveTargetValue(goal.target_value));
    }
    if current_progress < 0 {
        return Err(GoalValidationError::NegativeCurrentProgress(current_progress));
    }
    if goal.target_date.is_none() {
        return Err(GoalValidationError::MissingTargetDate);
    }

    Ok(())
}

fn require_text(value: &str, field: &'static str) -> Result<(), GoalValidationError> {
    if value.trim().is_empty() {
        return Err(GoalValidationError::BlankField(field));
    }
    Ok(())
}
