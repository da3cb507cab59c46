//! User account use-case service.
//!
//! # Invariants
//! - Emails are never written to logs.

use crate::model::user::{User, UserAggregate};
use crate::repo::user_repo::UserRepository;
use crate::service::error::ServiceResult;
use log::info;

/// Use-case service for user accounts.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user and returns it with its generated id.
    pub fn create_user(&self, email: &str) -> ServiceResult<User> {
        let user = self.repo.create_user(email)?;
        info!(
            "event=user_create module=user_service status=ok user_id={}",
            user.user_id
        );
        Ok(user)
    }

    /// Gets one user by id, failing with `NotFound` when absent.
    pub fn get_user(&self, user_id: &str) -> ServiceResult<User> {
        Ok(self.repo.get_user(user_id)?)
    }

    /// Loads the user with every character, goal and channel it owns.
    pub fn get_user_aggregate(&self, user_id: &str) -> ServiceResult<UserAggregate> {
        let aggregate = self.repo.load_user_aggregate(user_id)?;
        info!(
            "event=user_aggregate_load module=user_service status=ok characters={} goals={} channels={}",
            aggregate.characters.len(),
            aggregate.goals.len(),
            aggregate.notification_channels.len()
        );
        Ok(aggregate)
    }
}
