//! Notification channel model.

use crate::model::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// External destination that receives goal alerts, e.g. a Discord channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannel {
    pub user_id: UserId,
    /// Channel family such as `DISCORD`.
    pub channel_type: String,
    /// Channel-specific address.
    pub identifier: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
