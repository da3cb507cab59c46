//! Notification channel use-case service.
//!
//! # Invariants
//! - Channel identifiers are addresses and are never written to logs.

use crate::model::notification_channel::NotificationChannel;
use crate::repo::notification_channel_repo::NotificationChannelRepository;
use crate::service::error::ServiceResult;
use log::info;

/// Use-case service for notification channels.
pub struct NotificationChannelService<R: NotificationChannelRepository> {
    repo: R,
}

impl<R: NotificationChannelRepository> NotificationChannelService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a channel for a user.
    pub fn create_notification_channel(
        &self,
        user_id: &str,
        channel_type: &str,
        identifier: &str,
        is_active: bool,
    ) -> ServiceResult<NotificationChannel> {
        let channel =
            self.repo
                .create_notification_channel(user_id, channel_type, identifier, is_active)?;
        info!(
            "event=channel_create module=notification_channel_service status=ok user_id={} channel_type={} is_active={}",
            channel.user_id, channel.channel_type, channel.is_active
        );
        Ok(channel)
    }

    /// Lists channels of one user; empty when the user has none.
    pub fn get_notification_channels(
        &self,
        user_id: &str,
    ) -> ServiceResult<Vec<NotificationChannel>> {
        Ok(self.repo.get_notification_channels(user_id)?)
    }
}
