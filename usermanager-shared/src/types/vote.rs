use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{UserId, VoteId};

/// Accepted values of a vote request.
///
/// `Withdraw` never reaches the store: withdrawing deletes the vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteValue {
    Up,
    Down,
    Withdraw,
}

impl VoteValue {
    pub fn as_i32(&self) -> i32 {
        match self {
            VoteValue::Up => 1,
            VoteValue::Down => -1,
            VoteValue::Withdraw => 0,
        }
    }
}

impl TryFrom<i32> for VoteValue {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteValue::Up),
            -1 => Ok(VoteValue::Down),
            0 => Ok(VoteValue::Withdraw),
            other => Err(other),
        }
    }
}

/// A single vote event cast by `created_user_id`.
///
/// The target of the vote lives on the matching [`UserVote`](crate::types::UserVote).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub vote_id: VoteId,
    pub vote: i32,
    pub created_user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Vote {
    /// An unsaved vote; the store assigns `vote_id`.
    pub fn new(vote: i32, voter: UserId, created_at: DateTime<Utc>) -> Self {
        Self {
            vote_id: 0,
            vote,
            created_user_id: voter,
            created_at,
        }
    }
}

/// Groups votes by the id of the user who cast them, keeping input order.
pub fn group_votes_by_voter(votes: Vec<Vote>) -> HashMap<UserId, Vec<Vote>> {
    let mut grouped: HashMap<UserId, Vec<Vote>> = HashMap::new();
    for vote in votes {
        grouped.entry(vote.created_user_id).or_default().push(vote);
    }
    grouped
}
