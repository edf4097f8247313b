//! This module defines the `VoteRepository` trait, the durable store for
//! votes and the user-vote rows that join a vote to its target.
use usermanager_shared::types::{UserId, UserVote, UserVoteId, Vote, VoteId};

use crate::errors::StoreError;

/// A trait that defines the interface for the durable vote store.
///
/// Votes and their user-vote join rows are written by separate calls; the
/// voting engine sequences them.
#[async_trait::async_trait]
pub trait VoteRepository: Send + Sync {
    /// Inserts a vote.
    ///
    /// # Arguments
    ///
    /// * `vote` - The vote to persist. Its `vote_id` is ignored.
    ///
    /// # Returns
    ///
    /// The stored vote carrying the `vote_id` assigned by the store.
    async fn save_vote(&self, vote: &Vote) -> Result<Vote, StoreError>;

    /// Overwrites the value of an existing vote in place.
    ///
    /// # Returns
    ///
    /// The updated vote, or [`StoreError::NotFound`] when `vote.vote_id`
    /// matches no row.
    async fn update_vote(&self, vote: &Vote) -> Result<Vote, StoreError>;

    /// Looks up a single vote.
    ///
    /// # Arguments
    ///
    /// * `vote_id` - Identifier assigned by [`save_vote`](Self::save_vote).
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no such vote exists.
    async fn find_vote_by_id(&self, vote_id: VoteId) -> Result<Option<Vote>, StoreError>;

    /// All votes cast by `voter`, newest first.
    async fn find_votes_by_voter(&self, voter: &UserId) -> Result<Vec<Vote>, StoreError>;

    /// All votes cast by any of `voters` in a single query, newest first.
    ///
    /// # Arguments
    ///
    /// * `voters` - Voter identities. An empty slice yields an empty result
    ///   without touching the store.
    async fn find_votes_by_voters(&self, voters: &[UserId]) -> Result<Vec<Vote>, StoreError>;

    /// Looks up a single join row by its own identifier. `Ok(None)` when
    /// absent.
    async fn find_user_vote_by_id(&self, id: UserVoteId) -> Result<Option<UserVote>, StoreError>;

    /// All join rows whose target is `target`.
    async fn find_user_votes_by_target(&self, target: &UserId) -> Result<Vec<UserVote>, StoreError>;

    /// Inserts a join row linking a vote to its target.
    ///
    /// # Arguments
    ///
    /// * `user_vote` - The join row. Its `id` is ignored.
    ///
    /// # Returns
    ///
    /// The stored row carrying the `id` assigned by the store.
    async fn save_user_vote(&self, user_vote: &UserVote) -> Result<UserVote, StoreError>;

    /// Removes a vote. Fails with [`StoreError::NotFound`] when no row was affected.
    async fn delete_vote(&self, vote_id: VoteId) -> Result<(), StoreError>;

    /// Removes a join row. Fails with [`StoreError::NotFound`] when no row was affected.
    async fn delete_user_vote(&self, id: UserVoteId) -> Result<(), StoreError>;
}
