use std::sync::Arc;
use std::time::Duration;

use usermanager_shared::types::{UserId, UserVote, UserVoteId, Vote};

use super::{get_json, set_json};
use crate::{CacheError, CacheStorage};

/// Typed cache for votes and user-vote join rows.
///
/// Keys:
/// - `vote:voter:<uuid>`: votes cast by one voter
/// - `vote:voters:<json id list>`: votes cast by a batch of voters
/// - `user_vote:target:<uuid>`: join rows of one target
/// - `user_vote:id:<id>`: a single join row
#[derive(Clone)]
pub struct VoteCache {
    storage: Arc<dyn CacheStorage>,
    ttl: Duration,
}

impl VoteCache {
    pub fn new(storage: Arc<dyn CacheStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn voter_key(voter: &UserId) -> String {
        format!("vote:voter:{voter}")
    }

    pub fn voters_key(voters: &[UserId]) -> Result<String, CacheError> {
        Ok(format!("vote:voters:{}", serde_json::to_string(voters)?))
    }

    pub fn target_key(target: &UserId) -> String {
        format!("user_vote:target:{target}")
    }

    pub fn user_vote_key(id: UserVoteId) -> String {
        format!("user_vote:id:{id}")
    }

    pub async fn get_votes_by_voter(&self, voter: &UserId) -> Result<Option<Vec<Vote>>, CacheError> {
        get_json(self.storage.as_ref(), &Self::voter_key(voter)).await
    }

    pub async fn set_votes_by_voter(&self, voter: &UserId, votes: &[Vote]) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::voter_key(voter), votes, self.ttl).await
    }

    pub async fn get_votes_by_voters(&self, voters: &[UserId]) -> Result<Option<Vec<Vote>>, CacheError> {
        get_json(self.storage.as_ref(), &Self::voters_key(voters)?).await
    }

    pub async fn set_votes_by_voters(&self, voters: &[UserId], votes: &[Vote]) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::voters_key(voters)?, votes, self.ttl).await
    }

    pub async fn get_user_votes_by_target(
        &self,
        target: &UserId,
    ) -> Result<Option<Vec<UserVote>>, CacheError> {
        get_json(self.storage.as_ref(), &Self::target_key(target)).await
    }

    pub async fn set_user_votes_by_target(
        &self,
        target: &UserId,
        user_votes: &[UserVote],
    ) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::target_key(target), user_votes, self.ttl).await
    }

    pub async fn get_user_vote(&self, id: UserVoteId) -> Result<Option<UserVote>, CacheError> {
        get_json(self.storage.as_ref(), &Self::user_vote_key(id)).await
    }

    pub async fn set_user_vote(&self, user_vote: &UserVote) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::user_vote_key(user_vote.id), user_vote, self.ttl).await
    }

    /// Drops the entries a vote transition between `voter` and `target` makes
    /// stale. `user_vote` names a join row that was removed.
    pub async fn invalidate_pair(
        &self,
        voter: &UserId,
        target: &UserId,
        user_vote: Option<UserVoteId>,
    ) -> Result<(), CacheError> {
        let mut keys = vec![Self::voter_key(voter), Self::target_key(target)];
        keys.extend(user_vote.map(Self::user_vote_key));
        self.storage.delete(&keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use chrono::Utc;
    use uuid::Uuid;

    fn cache() -> VoteCache {
        VoteCache::new(Arc::new(MemoryStorage::new()), Duration::from_secs(60))
    }

    #[test]
    fn batch_key_lists_ids_in_order() {
        let a = Uuid::nil();
        let key = VoteCache::voters_key(&[a]).unwrap();
        assert_eq!(key, r#"vote:voters:["00000000-0000-0000-0000-000000000000"]"#);
        assert_eq!(VoteCache::user_vote_key(5), "user_vote:id:5");
    }

    #[tokio::test]
    async fn pair_invalidation_drops_voter_and_target_entries() {
        let cache = cache();
        let voter = Uuid::new_v4();
        let target = Uuid::new_v4();
        let mut vote = Vote::new(1, voter, Utc::now());
        vote.vote_id = 1;
        let user_vote = UserVote {
            id: 3,
            user_id: target,
            vote_id: 1,
        };

        cache.set_votes_by_voter(&voter, &[vote.clone()]).await.unwrap();
        cache
            .set_user_votes_by_target(&target, &[user_vote.clone()])
            .await
            .unwrap();
        cache.set_user_vote(&user_vote).await.unwrap();
        assert_eq!(
            cache.get_votes_by_voter(&voter).await.unwrap(),
            Some(vec![vote])
        );

        cache.invalidate_pair(&voter, &target, Some(3)).await.unwrap();
        assert!(cache.get_votes_by_voter(&voter).await.unwrap().is_none());
        assert!(cache.get_user_votes_by_target(&target).await.unwrap().is_none());
        assert!(cache.get_user_vote(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_vote_list_is_a_hit() {
        let cache = cache();
        let voter = Uuid::new_v4();
        cache.set_votes_by_voter(&voter, &[]).await.unwrap();
        assert_eq!(cache.get_votes_by_voter(&voter).await.unwrap(), Some(vec![]));
    }
}
