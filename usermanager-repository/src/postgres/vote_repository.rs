//! PostgreSQL implementation of the vote store.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use usermanager_shared::types::{UserId, UserVote, UserVoteId, Vote, VoteId};

use super::map_write_error;
use crate::{StoreError, VoteRepository};

/// PostgreSQL-backed vote store over the `vote` and `user_votes` tables.
pub struct PostgresVoteRepository {
    pool: sqlx::PgPool,
}

impl PostgresVoteRepository {
    /// Creates a new repository over a migrated pool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    vote_id: VoteId,
    vote: i32,
    created_user_id: UserId,
    created_at: DateTime<Utc>,
}

impl From<VoteRow> for Vote {
    fn from(row: VoteRow) -> Self {
        Vote {
            vote_id: row.vote_id,
            vote: row.vote,
            created_user_id: row.created_user_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserVoteRow {
    id: UserVoteId,
    user_id: UserId,
    vote_id: VoteId,
}

impl From<UserVoteRow> for UserVote {
    fn from(row: UserVoteRow) -> Self {
        UserVote {
            id: row.id,
            user_id: row.user_id,
            vote_id: row.vote_id,
        }
    }
}

#[async_trait]
impl VoteRepository for PostgresVoteRepository {
    async fn save_vote(&self, vote: &Vote) -> Result<Vote, StoreError> {
        let vote_id: VoteId = sqlx::query_scalar(
            "INSERT INTO vote (vote, created_user_id, created_at) VALUES ($1, $2, $3) RETURNING vote_id",
        )
        .bind(vote.vote)
        .bind(vote.created_user_id)
        .bind(vote.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(Vote {
            vote_id,
            ..vote.clone()
        })
    }

    async fn update_vote(&self, vote: &Vote) -> Result<Vote, StoreError> {
        sqlx::query_as::<_, VoteRow>(
            "UPDATE vote SET vote = $1 WHERE vote_id = $2 \
             RETURNING vote_id, vote, created_user_id, created_at",
        )
        .bind(vote.vote)
        .bind(vote.vote_id)
        .fetch_optional(&self.pool)
        .await?
        .map(Vote::from)
        .ok_or_else(|| StoreError::not_found("vote", vote.vote_id))
    }

    async fn find_vote_by_id(&self, vote_id: VoteId) -> Result<Option<Vote>, StoreError> {
        let vote = sqlx::query_as::<_, VoteRow>(
            "SELECT vote_id, vote, created_user_id, created_at FROM vote WHERE vote_id = $1",
        )
        .bind(vote_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(vote.map(Vote::from))
    }

    async fn find_votes_by_voter(&self, voter: &UserId) -> Result<Vec<Vote>, StoreError> {
        let votes = sqlx::query_as::<_, VoteRow>(
            "SELECT vote_id, vote, created_user_id, created_at FROM vote \
             WHERE created_user_id = $1 ORDER BY created_at DESC, vote_id DESC",
        )
        .bind(voter)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes.into_iter().map(Vote::from).collect())
    }

    async fn find_votes_by_voters(&self, voters: &[UserId]) -> Result<Vec<Vote>, StoreError> {
        if voters.is_empty() {
            return Ok(Vec::new());
        }

        let votes = sqlx::query_as::<_, VoteRow>(
            "SELECT vote_id, vote, created_user_id, created_at FROM vote \
             WHERE created_user_id = ANY($1) ORDER BY created_at DESC, vote_id DESC",
        )
        .bind(voters)
        .fetch_all(&self.pool)
        .await?;

        Ok(votes.into_iter().map(Vote::from).collect())
    }

    async fn find_user_vote_by_id(&self, id: UserVoteId) -> Result<Option<UserVote>, StoreError> {
        let user_vote = sqlx::query_as::<_, UserVoteRow>(
            "SELECT id, user_id, vote_id FROM user_votes WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_vote.map(UserVote::from))
    }

    async fn find_user_votes_by_target(&self, target: &UserId) -> Result<Vec<UserVote>, StoreError> {
        let user_votes = sqlx::query_as::<_, UserVoteRow>(
            "SELECT id, user_id, vote_id FROM user_votes WHERE user_id = $1 ORDER BY id",
        )
        .bind(target)
        .fetch_all(&self.pool)
        .await?;

        Ok(user_votes.into_iter().map(UserVote::from).collect())
    }

    async fn save_user_vote(&self, user_vote: &UserVote) -> Result<UserVote, StoreError> {
        let id: UserVoteId = sqlx::query_scalar(
            "INSERT INTO user_votes (user_id, vote_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_vote.user_id)
        .bind(user_vote.vote_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(UserVote {
            id,
            ..user_vote.clone()
        })
    }

    async fn delete_vote(&self, vote_id: VoteId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM vote WHERE vote_id = $1")
            .bind(vote_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("vote", vote_id));
        }
        Ok(())
    }

    async fn delete_user_vote(&self, id: UserVoteId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM user_votes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user_vote", id));
        }
        Ok(())
    }
}
