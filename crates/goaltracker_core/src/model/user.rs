//! User account model.

use crate::model::character::Character;
use crate::model::goal::TrackedGoal;
use crate::model::notification_channel::NotificationChannel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-generated user identifier.
///
/// Kept as a string because callers address users by opaque ids.
pub type UserId = String;

/// Registered player account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Immutable id assigned on creation.
    pub user_id: UserId,
    /// Stored trimmed.
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything stored under one user partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAggregate {
    pub user: User,
    pub characters: Vec<Character>,
    pub goals: Vec<TrackedGoal>,
    pub notification_channels: Vec<NotificationChannel>,
}
