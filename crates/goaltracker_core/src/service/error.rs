//! Caller-facing error contract for core use-cases.

use crate::model::goal::GoalValidationError;
use crate::repo::entity_table::RepoError;
use thiserror::Error;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure of a use-case call.
///
/// `InvalidInput` is always recoverable by correcting the request. Every
/// other variant is an operation failure; `NotFound` and `Conflict` stay
/// distinguishable so callers can pick a precise response.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Storage(RepoError),
}

impl ServiceError {
    /// Returns whether the caller can fix this failure by changing input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// HTTP status class used by outer request handlers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::Storage(_) => 500,
        }
    }

    /// Stable machine-readable code for log lines and envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Storage(_) => "storage_failure",
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::InvalidInput(message) => Self::InvalidInput(message),
            RepoError::Validation(err) => err.into(),
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Storage(other),
        }
    }
}

impl From<GoalValidationError> for ServiceError {
    fn from(value: GoalValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}
