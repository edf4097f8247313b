use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use usermanager_shared::types::{UserId, UserVote, UserVoteId, Vote, VoteId};

use crate::{StoreError, VoteRepository};

#[derive(Default)]
struct Tables {
    votes: BTreeMap<VoteId, Vote>,
    user_votes: BTreeMap<UserVoteId, UserVote>,
    next_vote_id: VoteId,
    next_user_vote_id: UserVoteId,
}

/// Vote store kept in memory. Identities are assigned from 1 upwards like a
/// `BIGSERIAL` column.
#[derive(Default)]
pub struct MemoryVoteRepository {
    tables: RwLock<Tables>,
}

impl MemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored vote rows.
    pub async fn vote_rows(&self) -> usize {
        self.tables.read().await.votes.len()
    }

    /// Number of stored user-vote join rows.
    pub async fn user_vote_rows(&self) -> usize {
        self.tables.read().await.user_votes.len()
    }
}

/// Newest first, ties broken by the higher id.
fn newest_first(votes: &mut [Vote]) {
    votes.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.vote_id.cmp(&a.vote_id))
    });
}

#[async_trait]
impl VoteRepository for MemoryVoteRepository {
    async fn save_vote(&self, vote: &Vote) -> Result<Vote, StoreError> {
        if !(-1..=1).contains(&vote.vote) {
            return Err(StoreError::InvalidRow(format!("vote value {}", vote.vote)));
        }

        let mut tables = self.tables.write().await;
        tables.next_vote_id += 1;
        let stored = Vote {
            vote_id: tables.next_vote_id,
            ..vote.clone()
        };
        tables.votes.insert(stored.vote_id, stored.clone());
        Ok(stored)
    }

    async fn update_vote(&self, vote: &Vote) -> Result<Vote, StoreError> {
        if !(-1..=1).contains(&vote.vote) {
            return Err(StoreError::InvalidRow(format!("vote value {}", vote.vote)));
        }

        let mut tables = self.tables.write().await;
        let stored = tables
            .votes
            .get_mut(&vote.vote_id)
            .ok_or_else(|| StoreError::not_found("vote", vote.vote_id))?;
        stored.vote = vote.vote;
        Ok(stored.clone())
    }

    async fn find_vote_by_id(&self, vote_id: VoteId) -> Result<Option<Vote>, StoreError> {
        Ok(self.tables.read().await.votes.get(&vote_id).cloned())
    }

    async fn find_votes_by_voter(&self, voter: &UserId) -> Result<Vec<Vote>, StoreError> {
        self.find_votes_by_voters(std::slice::from_ref(voter)).await
    }

    async fn find_votes_by_voters(&self, voters: &[UserId]) -> Result<Vec<Vote>, StoreError> {
        let tables = self.tables.read().await;
        let mut votes: Vec<Vote> = tables
            .votes
            .values()
            .filter(|v| voters.contains(&v.created_user_id))
            .cloned()
            .collect();
        newest_first(&mut votes);
        Ok(votes)
    }

    async fn find_user_vote_by_id(&self, id: UserVoteId) -> Result<Option<UserVote>, StoreError> {
        Ok(self.tables.read().await.user_votes.get(&id).cloned())
    }

    async fn find_user_votes_by_target(&self, target: &UserId) -> Result<Vec<UserVote>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_votes
            .values()
            .filter(|uv| &uv.user_id == target)
            .cloned()
            .collect())
    }

    async fn save_user_vote(&self, user_vote: &UserVote) -> Result<UserVote, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.user_votes.values().any(|uv| uv.vote_id == user_vote.vote_id) {
            return Err(StoreError::UniqueViolation("user_votes_vote_id_key".to_string()));
        }

        tables.next_user_vote_id += 1;
        let stored = UserVote {
            id: tables.next_user_vote_id,
            ..user_vote.clone()
        };
        tables.user_votes.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_vote(&self, vote_id: VoteId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .votes
            .remove(&vote_id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("vote", vote_id))
    }

    async fn delete_user_vote(&self, id: UserVoteId) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .user_votes
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found("user_vote", id))
    }
}
