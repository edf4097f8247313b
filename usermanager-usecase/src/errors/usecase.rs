use chrono::{DateTime, Utc};
use thiserror::Error;
use usermanager_repository::{CacheError, StoreError};
use usermanager_shared::types::UserId;
use usermanager_shared::{CredentialError, PermissionError};

use super::ErrorKind;

/// Represents errors raised by the voting engine and the user service.
///
/// Infrastructure failures carry the `stage` that produced them, e.g.
/// `"create_user.save_user"`. Benign voting conditions (already voted,
/// nothing to withdraw) are not errors, see
/// [`VoteOutcome`](crate::VoteOutcome).
#[derive(Debug, Error)]
pub enum UsecaseError {
    #[error("{stage}: {source}")]
    Store {
        stage: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{stage}: {source}")]
    Cache {
        stage: &'static str,
        #[source]
        source: CacheError,
    },

    #[error("{stage}: {source}")]
    Credential {
        stage: &'static str,
        #[source]
        source: CredentialError,
    },

    #[error("{stage}: background task failed: {source}")]
    Task {
        stage: &'static str,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("Nickname {0} is already taken")]
    DuplicateNickname(String),

    #[error("Invalid nickname or password")]
    InvalidCredentials,

    #[error("Invalid vote value {0}, expected -1, 0 or 1")]
    InvalidVoteValue(i32),

    #[error("Users can't vote for themselves")]
    SelfVote,

    #[error("User {voter} can vote again at {retry_at}")]
    VoteInterval {
        voter: UserId,
        retry_at: DateTime<Utc>,
    },

    #[error("User {0} not found")]
    UserNotFound(UserId),

    #[error(transparent)]
    Permission(#[from] PermissionError),
}

impl UsecaseError {
    /// Wraps a store error with the stage that raised it, for use with `map_err`.
    pub fn store(stage: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Store { stage, source }
    }

    /// Wraps a cache error with the stage that raised it, for use with `map_err`.
    pub fn cache(stage: &'static str) -> impl FnOnce(CacheError) -> Self {
        move |source| Self::Cache { stage, source }
    }

    pub fn credential(stage: &'static str) -> impl FnOnce(CredentialError) -> Self {
        move |source| Self::Credential { stage, source }
    }

    pub fn task(stage: &'static str) -> impl FnOnce(tokio::task::JoinError) -> Self {
        move |source| Self::Task { stage, source }
    }

    /// Stage tag of infrastructure failures.
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            Self::Store { stage, .. }
            | Self::Cache { stage, .. }
            | Self::Credential { stage, .. }
            | Self::Task { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store { source, .. } => match source {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::UniqueViolation(_) => ErrorKind::Conflict,
                _ => ErrorKind::Infrastructure,
            },
            Self::Cache { .. } | Self::Task { .. } => ErrorKind::Infrastructure,
            Self::Credential { source, .. } => match source {
                CredentialError::Mismatch => ErrorKind::PermissionDenied,
                CredentialError::Hash(_) => ErrorKind::Infrastructure,
            },
            Self::DuplicateNickname(_) => ErrorKind::Conflict,
            Self::InvalidCredentials => ErrorKind::PermissionDenied,
            Self::InvalidVoteValue(_) | Self::SelfVote => ErrorKind::InvalidInput,
            Self::VoteInterval { .. } => ErrorKind::RateLimited,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            Self::Permission(PermissionError::UnknownRole(_)) => ErrorKind::InvalidInput,
            Self::Permission(_) => ErrorKind::PermissionDenied,
        }
    }
}
