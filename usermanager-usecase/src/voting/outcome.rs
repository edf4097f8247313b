use usermanager_shared::types::{UserVote, Vote};

/// Result of a vote request for a (target, voter) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    /// No vote existed; a vote and its join row were inserted.
    Created { vote: Vote, user_vote: UserVote },
    /// A vote with another value existed and was changed in place.
    Updated { vote: Vote, user_vote: UserVote },
    /// The same value was already cast. Nothing changed.
    AlreadyVoted { vote: Vote, user_vote: UserVote },
    /// The active vote and its join row were deleted.
    Withdrawn { vote: Vote, user_vote: UserVote },
    /// Withdrawal requested with no active vote. Nothing changed.
    NothingToWithdraw,
}

impl VoteOutcome {
    pub fn vote(&self) -> Option<&Vote> {
        match self {
            Self::Created { vote, .. }
            | Self::Updated { vote, .. }
            | Self::AlreadyVoted { vote, .. }
            | Self::Withdrawn { vote, .. } => Some(vote),
            Self::NothingToWithdraw => None,
        }
    }

    pub fn user_vote(&self) -> Option<&UserVote> {
        match self {
            Self::Created { user_vote, .. }
            | Self::Updated { user_vote, .. }
            | Self::AlreadyVoted { user_vote, .. }
            | Self::Withdrawn { user_vote, .. } => Some(user_vote),
            Self::NothingToWithdraw => None,
        }
    }

    /// Whether the store was modified.
    pub fn is_change(&self) -> bool {
        matches!(
            self,
            Self::Created { .. } | Self::Updated { .. } | Self::Withdrawn { .. }
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Updated { .. } => "updated",
            Self::AlreadyVoted { .. } => "already_voted",
            Self::Withdrawn { .. } => "withdrawn",
            Self::NothingToWithdraw => "nothing_to_withdraw",
        }
    }
}
