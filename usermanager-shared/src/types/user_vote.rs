use serde::{Deserialize, Serialize};

use crate::types::{UserId, UserVoteId, Vote, VoteId};

/// Join row linking the user being voted on (`user_id`) to a [`Vote`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserVote {
    pub id: UserVoteId,
    pub user_id: UserId,
    pub vote_id: VoteId,
}

impl UserVote {
    /// An unsaved join row for `target`; the store assigns `id`.
    pub fn new(target: UserId, vote_id: VoteId) -> Self {
        Self {
            id: 0,
            user_id: target,
            vote_id,
        }
    }

    pub fn for_vote(target: UserId, vote: &Vote) -> Self {
        Self::new(target, vote.vote_id)
    }
}
