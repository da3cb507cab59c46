//! Goal creation pipeline.
//!
//! # Responsibility
//! - Validate a goal candidate and its initial progress.
//! - Map the goal to its storage entity, persist it, and map it back.
//! - Read stored goals back together with their progress snapshots.
//!
//! # Invariants
//! - Validation runs before any repository call; a rejected goal writes nothing.
//! - The returned progress equals the value supplied at creation.
//! - Storage failures are surfaced once, without retry.

use crate::model::goal::{validate_goal, Goal, GoalId, TrackedGoal};
use crate::repo::goal_repo::{GoalEntity, GoalRepository};
use crate::service::error::{ServiceError, ServiceResult};
use log::{info, warn};

/// Use-case service for goals.
pub struct GoalService<R: GoalRepository> {
    repo: R,
}

impl<R: GoalRepository> GoalService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a goal together with its initial progress snapshot.
    ///
    /// # Errors
    /// - `InvalidInput` naming the first field that failed validation.
    /// - `Conflict` when the goal id is already taken.
    /// - `Storage` for any other persistence failure.
    pub fn create_goal(&self, goal: &Goal, current_progress: i64) -> ServiceResult<TrackedGoal> {
        if let Err(err) = validate_goal(Some(goal), current_progress) {
            warn!(
                "event=goal_create module=goal_service status=rejected field={}",
                err.field()
            );
            return Err(err.into());
        }

        info!(
            "event=goal_create module=goal_service status=start user_id={} target_attribute={}",
            goal.user_id.trim(),
            goal.target_attribute.trim()
        );

        let entity = GoalEntity::from_goal(goal)?;
        let record = self
            .repo
            .create_goal(&entity, current_progress)
            .map_err(ServiceError::from)
            .inspect_err(|err| {
                warn!(
                    "event=goal_create module=goal_service status=error error_code={} error={}",
                    err.code(),
                    err
                );
            })?;

        info!(
            "event=goal_create module=goal_service status=ok goal_id={}",
            record.metadata.goal_id
        );
        Ok(record.into())
    }

    /// Gets one goal of a user, failing with `NotFound` when absent.
    pub fn get_goal(&self, user_id: &str, goal_id: GoalId) -> ServiceResult<TrackedGoal> {
        self.repo
            .get_goal(user_id, goal_id)?
            .map(Into::into)
            .ok_or_else(|| ServiceError::NotFound {
                entity: "goal",
                id: goal_id.to_string(),
            })
    }

    /// Lists goals of one user. Returns an empty list when there are none.
    pub fn get_goals_for_user(&self, user_id: &str) -> ServiceResult<Vec<TrackedGoal>> {
        let records = self.repo.get_goals_for_user(user_id)?;
        Ok(records.into_iter().map(Into::into).collect())
    }
}
