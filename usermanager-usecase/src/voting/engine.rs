//! The voting engine.
//!
//! Every (target, voter) pair is in one of two states: no active vote, or an
//! active vote with value `+1` or `-1`. Casting inserts or flips the vote,
//! withdrawing deletes it together with its join row. Transitions for a pair
//! run under [`PairLocks`] so the existence check and the write that follows
//! cannot interleave with another request for the same pair.
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use usermanager_repository::{StoreError, VoteCache, VoteRepository};
use usermanager_shared::types::{User, UserId, UserVote, UserVoteId, Vote, VoteId, VoteValue};

use super::{attach_votes, PairLocks, VoteOutcome, VoterLocks};
use crate::{Clock, UsecaseError};

/// Minimum time between two casts of the same voter.
pub const DEFAULT_VOTE_INTERVAL: Duration = Duration::from_secs(3600);

pub struct VotingEngine {
    votes: Arc<dyn VoteRepository>,
    cache: VoteCache,
    clock: Arc<dyn Clock>,
    locks: PairLocks,
    voter_locks: VoterLocks,
    vote_interval: TimeDelta,
}

impl VotingEngine {
    /// Creates a new `VotingEngine`.
    ///
    /// # Arguments
    ///
    /// * `votes` - The durable vote store
    /// * `cache` - Cache-aside repository for vote reads
    /// * `clock` - Source of vote timestamps and of "now" for the rate limit
    ///
    /// # Returns
    ///
    /// An engine using [`DEFAULT_VOTE_INTERVAL`] as its rate limit.
    pub fn new(votes: Arc<dyn VoteRepository>, cache: VoteCache, clock: Arc<dyn Clock>) -> Self {
        Self {
            votes,
            cache,
            clock,
            locks: PairLocks::new(),
            voter_locks: VoterLocks::new(),
            vote_interval: TimeDelta::seconds(DEFAULT_VOTE_INTERVAL.as_secs() as i64),
        }
    }

    /// Overrides the minimum time between two casts of the same voter.
    /// Intervals too large for a [`TimeDelta`] saturate.
    pub fn with_vote_interval(mut self, interval: Duration) -> Self {
        self.vote_interval = TimeDelta::from_std(interval).unwrap_or(TimeDelta::MAX);
        self
    }

    /// The configured minimum time between two casts of the same voter.
    pub fn vote_interval(&self) -> TimeDelta {
        self.vote_interval
    }

    /// Guarded entry used by transports: rejects self-votes, applies the rate
    /// limit to casts (not to withdrawals), then dispatches through
    /// [`vote`](Self::vote).
    ///
    /// Every cast of a voter runs under that voter's lock, so the interval
    /// check and the write it allows cannot interleave with another cast of
    /// the same voter in this process.
    ///
    /// # Arguments
    ///
    /// * `voter` - The user casting the vote
    /// * `target` - The user being voted on
    /// * `value` - `1`, `-1`, or `0` to withdraw
    ///
    /// # Returns
    ///
    /// The [`VoteOutcome`] of the transition, or `VoteInterval` when the
    /// voter cast within the configured interval.
    pub async fn cast(
        &self,
        voter: UserId,
        target: UserId,
        value: i32,
    ) -> Result<VoteOutcome, UsecaseError> {
        if voter == target {
            return Err(UsecaseError::SelfVote);
        }
        let value = VoteValue::try_from(value).map_err(UsecaseError::InvalidVoteValue)?;

        let _voter_guard = self.voter_locks.lock(voter).await;
        if value != VoteValue::Withdraw {
            self.check_vote_interval(&voter).await?;
        }

        let vote = Vote::new(value.as_i32(), voter, self.clock.now());
        self.vote(vote, UserVote::new(target, 0)).await
    }

    /// Dispatches on the vote value: `+1`/`-1` cast or flip, `0` withdraws.
    ///
    /// The voter is `vote.created_user_id`, the target is `user_vote.user_id`.
    pub async fn vote(&self, vote: Vote, user_vote: UserVote) -> Result<VoteOutcome, UsecaseError> {
        if vote.created_user_id == user_vote.user_id {
            return Err(UsecaseError::SelfVote);
        }
        match VoteValue::try_from(vote.vote) {
            Ok(VoteValue::Up) | Ok(VoteValue::Down) => self.vote_user(vote, user_vote).await,
            Ok(VoteValue::Withdraw) => self.vote_user_withdraw(vote, user_vote).await,
            Err(value) => Err(UsecaseError::InvalidVoteValue(value)),
        }
    }

    /// Casts `vote.vote` (`+1` or `-1`) from the voter on the target.
    ///
    /// # Arguments
    ///
    /// * `vote` - Carries the voter and the value
    /// * `user_vote` - Carries the target
    ///
    /// # Returns
    ///
    /// `Created` for a first vote, `Updated` when an opposite vote was
    /// flipped in place, and `AlreadyVoted` when the same value is active.
    pub async fn vote_user(&self, vote: Vote, user_vote: UserVote) -> Result<VoteOutcome, UsecaseError> {
        let voter = vote.created_user_id;
        let target = user_vote.user_id;
        if voter == target {
            return Err(UsecaseError::SelfVote);
        }
        match VoteValue::try_from(vote.vote) {
            Ok(VoteValue::Up) | Ok(VoteValue::Down) => {}
            Ok(VoteValue::Withdraw) => return Err(UsecaseError::InvalidVoteValue(0)),
            Err(value) => return Err(UsecaseError::InvalidVoteValue(value)),
        }

        let _guard = self.locks.lock(target, voter).await;

        let outcome = match self.find_exist_voting(&target, &voter).await? {
            Some((existing, user_vote)) if existing.vote == vote.vote => {
                tracing::debug!(%voter, %target, vote_id = existing.vote_id, "Vote already exists");
                VoteOutcome::AlreadyVoted {
                    vote: existing,
                    user_vote,
                }
            }
            Some((existing, user_vote)) => {
                let flipped = Vote {
                    vote: vote.vote,
                    ..existing
                };
                let vote = self
                    .votes
                    .update_vote(&flipped)
                    .await
                    .map_err(UsecaseError::store("vote_user.update_vote"))?;
                tracing::info!(%voter, %target, vote_id = vote.vote_id, value = vote.vote, "Vote updated");
                VoteOutcome::Updated { vote, user_vote }
            }
            None => {
                let (vote, user_vote) = self.insert_vote(vote.vote, voter, target).await?;
                tracing::info!(%voter, %target, vote_id = vote.vote_id, value = vote.vote, "Vote created");
                VoteOutcome::Created { vote, user_vote }
            }
        };

        if outcome.is_change() {
            self.invalidate(&voter, &target, None).await;
        }
        Ok(outcome)
    }

    /// Withdraws the voter's active vote on the target.
    ///
    /// # Returns
    ///
    /// `Withdrawn` with the removed vote, or `NothingToWithdraw` when no vote
    /// is active or another writer removed it first.
    pub async fn vote_user_withdraw(
        &self,
        vote: Vote,
        user_vote: UserVote,
    ) -> Result<VoteOutcome, UsecaseError> {
        let voter = vote.created_user_id;
        let target = user_vote.user_id;
        if voter == target {
            return Err(UsecaseError::SelfVote);
        }

        let _guard = self.locks.lock(target, voter).await;

        let Some((vote, user_vote)) = self.find_exist_voting(&target, &voter).await? else {
            tracing::debug!(%voter, %target, "No vote to withdraw");
            return Ok(VoteOutcome::NothingToWithdraw);
        };

        match self.votes.delete_vote(vote.vote_id).await {
            Ok(()) => {}
            // Another process withdrew between our check and delete.
            Err(StoreError::NotFound { .. }) => {
                tracing::debug!(%voter, %target, vote_id = vote.vote_id, "Vote already withdrawn");
                self.invalidate(&voter, &target, Some(user_vote.id)).await;
                return Ok(VoteOutcome::NothingToWithdraw);
            }
            Err(e) => return Err(UsecaseError::store("vote_user_withdraw.delete_vote")(e)),
        }

        match self.votes.delete_user_vote(user_vote.id).await {
            Ok(()) | Err(StoreError::NotFound { .. }) => {}
            Err(e) => return Err(UsecaseError::store("vote_user_withdraw.delete_user_vote")(e)),
        }

        tracing::info!(%voter, %target, vote_id = vote.vote_id, "Vote withdrawn");
        self.invalidate(&voter, &target, Some(user_vote.id)).await;
        Ok(VoteOutcome::Withdrawn { vote, user_vote })
    }

    /// Finds the active vote of `voter` on `target`.
    ///
    /// Reads the store directly. `Ok(None)` when the voter has no votes, the
    /// target has no join rows, or the two do not intersect.
    pub async fn find_exist_voting(
        &self,
        target: &UserId,
        voter: &UserId,
    ) -> Result<Option<(Vote, UserVote)>, UsecaseError> {
        let votes = self
            .votes
            .find_votes_by_voter(voter)
            .await
            .map_err(UsecaseError::store("find_exist_voting.find_votes_by_voter"))?;
        if votes.is_empty() {
            return Ok(None);
        }

        let user_votes = self
            .votes
            .find_user_votes_by_target(target)
            .await
            .map_err(UsecaseError::store("find_exist_voting.find_user_votes_by_target"))?;
        if user_votes.is_empty() {
            return Ok(None);
        }

        // Votes come newest first, so a duplicated pair resolves to its latest vote.
        Ok(votes.into_iter().find_map(|vote| {
            user_votes
                .iter()
                .find(|uv| uv.vote_id == vote.vote_id)
                .cloned()
                .map(|uv| (vote, uv))
        }))
    }

    /// All votes cast by `user_id`, newest first. Cache-aside.
    pub async fn find_votes_for_user(&self, user_id: &UserId) -> Result<Vec<Vote>, UsecaseError> {
        if let Some(votes) = self
            .cache
            .get_votes_by_voter(user_id)
            .await
            .map_err(UsecaseError::cache("find_votes_for_user.cache_get"))?
        {
            tracing::debug!(%user_id, "Votes cache hit");
            return Ok(votes);
        }

        let votes = self
            .votes
            .find_votes_by_voter(user_id)
            .await
            .map_err(UsecaseError::store("find_votes_for_user.find_votes_by_voter"))?;
        if let Err(e) = self.cache.set_votes_by_voter(user_id, &votes).await {
            tracing::warn!(%user_id, error = %e, "Failed to cache votes");
        }
        Ok(votes)
    }

    /// Attaches to each user the votes it authored, fetched in one batch.
    /// Cache-aside on the batch of ids.
    pub async fn load_votes_to_users(&self, users: Vec<User>) -> Result<Vec<User>, UsecaseError> {
        if users.is_empty() {
            return Ok(users);
        }
        let ids: Vec<UserId> = users.iter().map(|user| user.user_id).collect();

        let votes = match self
            .cache
            .get_votes_by_voters(&ids)
            .await
            .map_err(UsecaseError::cache("load_votes_to_users.cache_get"))?
        {
            Some(votes) => votes,
            None => {
                let votes = self
                    .votes
                    .find_votes_by_voters(&ids)
                    .await
                    .map_err(UsecaseError::store("load_votes_to_users.find_votes_by_voters"))?;
                if let Err(e) = self.cache.set_votes_by_voters(&ids, &votes).await {
                    tracing::warn!(users = ids.len(), error = %e, "Failed to cache votes batch");
                }
                votes
            }
        };

        Ok(attach_votes(users, votes))
    }

    /// The most recent vote cast by `user_id`, read from the store.
    pub async fn get_last_vote_for_user(&self, user_id: &UserId) -> Result<Option<Vote>, UsecaseError> {
        let votes = self
            .votes
            .find_votes_by_voter(user_id)
            .await
            .map_err(UsecaseError::store("get_last_vote_for_user.find_votes_by_voter"))?;
        Ok(votes.into_iter().next())
    }

    /// A single vote by id, read from the store.
    pub async fn find_vote(&self, vote_id: VoteId) -> Result<Option<Vote>, UsecaseError> {
        self.votes
            .find_vote_by_id(vote_id)
            .await
            .map_err(UsecaseError::store("find_vote.find_vote_by_id"))
    }

    /// A single join row. Cache-aside.
    pub async fn find_user_vote(&self, id: UserVoteId) -> Result<Option<UserVote>, UsecaseError> {
        if let Some(user_vote) = self
            .cache
            .get_user_vote(id)
            .await
            .map_err(UsecaseError::cache("find_user_vote.cache_get"))?
        {
            return Ok(Some(user_vote));
        }

        let user_vote = self
            .votes
            .find_user_vote_by_id(id)
            .await
            .map_err(UsecaseError::store("find_user_vote.find_user_vote_by_id"))?;
        if let Some(user_vote) = &user_vote {
            if let Err(e) = self.cache.set_user_vote(user_vote).await {
                tracing::warn!(id, error = %e, "Failed to cache user vote");
            }
        }
        Ok(user_vote)
    }

    /// Join rows of every vote received by `target`. Cache-aside.
    pub async fn find_user_votes_for_target(&self, target: &UserId) -> Result<Vec<UserVote>, UsecaseError> {
        if let Some(user_votes) = self
            .cache
            .get_user_votes_by_target(target)
            .await
            .map_err(UsecaseError::cache("find_user_votes_for_target.cache_get"))?
        {
            return Ok(user_votes);
        }

        let user_votes = self
            .votes
            .find_user_votes_by_target(target)
            .await
            .map_err(UsecaseError::store("find_user_votes_for_target.find_user_votes_by_target"))?;
        if let Err(e) = self.cache.set_user_votes_by_target(target, &user_votes).await {
            tracing::warn!(%target, error = %e, "Failed to cache user votes");
        }
        Ok(user_votes)
    }

    async fn check_vote_interval(&self, voter: &UserId) -> Result<(), UsecaseError> {
        let Some(last) = self.get_last_vote_for_user(voter).await? else {
            return Ok(());
        };
        let now = self.clock.now();
        if now.signed_duration_since(last.created_at) < self.vote_interval {
            let retry_at = last
                .created_at
                .checked_add_signed(self.vote_interval)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            tracing::debug!(%voter, %retry_at, "Vote rejected by rate limit");
            return Err(UsecaseError::VoteInterval {
                voter: *voter,
                retry_at,
            });
        }
        Ok(())
    }

    /// Inserts a vote and its join row. A failed join insert removes the vote
    /// again so no vote row is left without a target.
    async fn insert_vote(
        &self,
        value: i32,
        voter: UserId,
        target: UserId,
    ) -> Result<(Vote, UserVote), UsecaseError> {
        let vote = self
            .votes
            .save_vote(&Vote::new(value, voter, self.clock.now()))
            .await
            .map_err(UsecaseError::store("vote_user.save_vote"))?;

        match self.votes.save_user_vote(&UserVote::for_vote(target, &vote)).await {
            Ok(user_vote) => Ok((vote, user_vote)),
            Err(e) => {
                if let Err(cleanup) = self.votes.delete_vote(vote.vote_id).await {
                    tracing::error!(vote_id = vote.vote_id, error = %cleanup, "Failed to remove orphaned vote");
                }
                Err(UsecaseError::store("vote_user.save_user_vote")(e))
            }
        }
    }

    async fn invalidate(&self, voter: &UserId, target: &UserId, user_vote: Option<UserVoteId>) {
        if let Err(e) = self.cache.invalidate_pair(voter, target, user_vote).await {
            tracing::warn!(%voter, %target, error = %e, "Failed to invalidate vote cache");
        }
    }
}
