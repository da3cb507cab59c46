//! Composite key scheme for the single-table entity store.
//!
//! # Responsibility
//! - Encode `(owner, entity type, entity id)` into the `(pk, sk)` pair.
//! - Keep all record kinds of one user inside one partition.
//!
//! # Invariants
//! - `pk` is always `USER#<owner_id>`, so one range query fetches an aggregate.
//! - Goal metadata and goal progress share the `GOAL#<goal_id>#` sort prefix.

use std::fmt::{Display, Formatter};

const PARTITION_PREFIX: &str = "USER#";
const USER_SORT_KEY: &str = "METADATA";

/// Separator between sort key segments.
pub const KEY_SEPARATOR: char = '#';

/// Record kind tag stored next to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    User,
    Character,
    Goal,
    Progress,
    NotificationChannel,
}

impl EntityType {
    /// Returns the persisted tag for this record kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Character => "CHARACTER",
            Self::Goal => "GOAL",
            Self::Progress => "PROGRESS",
            Self::NotificationChannel => "NOTIFICATION_CHANNEL",
        }
    }

    /// Parses a persisted tag back into a record kind.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Self::User),
            "CHARACTER" => Some(Self::Character),
            "GOAL" => Some(Self::Goal),
            "PROGRESS" => Some(Self::Progress),
            "NOTIFICATION_CHANNEL" => Some(Self::NotificationChannel),
            _ => None,
        }
    }
}

impl Display for EntityType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite identity of one stored record.
///
/// `entity_id` is empty for the user record itself; for children it is the
/// child identifier (character name, goal id, `<channel type>#<identifier>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub owner_id: String,
    pub entity_type: EntityType,
    pub entity_id: String,
}

impl EntityKey {
    pub fn user(user_id: &str) -> Self {
        Self::new(user_id, EntityType::User, "")
    }

    pub fn character(user_id: &str, name: &str) -> Self {
        Self::new(user_id, EntityType::Character, name)
    }

    pub fn goal(user_id: &str, goal_id: &str) -> Self {
        Self::new(user_id, EntityType::Goal, goal_id)
    }

    pub fn progress(user_id: &str, goal_id: &str) -> Self {
        Self::new(user_id, EntityType::Progress, goal_id)
    }

    /// `channel_type` must not contain [`KEY_SEPARATOR`]; `identifier` may.
    pub fn notification_channel(user_id: &str, channel_type: &str, identifier: &str) -> Self {
        Self::new(
            user_id,
            EntityType::NotificationChannel,
            format!("{channel_type}{KEY_SEPARATOR}{identifier}"),
        )
    }

    fn new(owner_id: &str, entity_type: EntityType, entity_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.to_string(),
            entity_type,
            entity_id: entity_id.into(),
        }
    }

    /// Partition key shared by the owner and all of its children.
    pub fn pk(&self) -> String {
        partition_key(&self.owner_id)
    }

    /// Type-tagged sort key unique inside the partition.
    pub fn sk(&self) -> String {
        match self.entity_type {
            EntityType::User => USER_SORT_KEY.to_string(),
            EntityType::Character => format!("CHARACTER#{}", self.entity_id),
            EntityType::Goal => format!("GOAL#{}#METADATA", self.entity_id),
            EntityType::Progress => format!("GOAL#{}#PROGRESS", self.entity_id),
            EntityType::NotificationChannel => format!("NOTIFICATION#{}", self.entity_id),
        }
    }
}

/// Builds the partition key for a user id.
pub fn partition_key(user_id: &str) -> String {
    format!("{PARTITION_PREFIX}{user_id}")
}
