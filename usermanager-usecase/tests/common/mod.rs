#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use usermanager_repository::{
    CacheError, CacheStorage, MemoryStorage, MemoryUserRepository, MemoryVoteRepository, StoreError,
    UserCache, UserRepository, VoteCache, VoteRepository,
};
use usermanager_shared::PaginationQuery;
use usermanager_shared::types::{User, UserId, UserVote, UserVoteId, Users, Vote, VoteId};
use usermanager_usecase::{Clock, UserService, VotingEngine};

pub const TTL: Duration = Duration::from_secs(60);

// ============================================================================
// Clock
// ============================================================================

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        }
    }

    pub fn advance(&self, seconds: i64) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::seconds(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

// ============================================================================
// Counting decorators
// ============================================================================

#[derive(Default)]
pub struct CountingUserRepository {
    inner: MemoryUserRepository,
    pub find_by_id: AtomicUsize,
    pub calls: AtomicUsize,
}

impl CountingUserRepository {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for CountingUserRepository {
    async fn find_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        self.hit();
        self.find_by_id.fetch_add(1, Ordering::SeqCst);
        self.inner.find_user_by_id(user_id).await
    }

    async fn find_user_by_nickname(&self, nickname: &str) -> Result<Option<User>, StoreError> {
        self.hit();
        self.inner.find_user_by_nickname(nickname).await
    }

    async fn get_users(&self, query: &PaginationQuery) -> Result<Users, StoreError> {
        self.hit();
        self.inner.get_users(query).await
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        self.hit();
        self.inner.save_user(user).await
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        self.hit();
        self.inner.update_user(user).await
    }

    async fn soft_delete_user(
        &self,
        user_id: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        self.hit();
        self.inner.soft_delete_user(user_id, deleted_at).await
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        self.hit();
        self.inner.delete_user(user_id).await
    }
}

/// Vote store decorator counting calls. It can also delay every call, fail
/// join-row inserts, or have another writer delete a vote just before the
/// next `delete_vote`.
#[derive(Default)]
pub struct CountingVoteRepository {
    pub inner: MemoryVoteRepository,
    pub calls: AtomicUsize,
    pub latency: Duration,
    pub fail_user_vote_inserts: AtomicBool,
    pub delete_concurrently: AtomicBool,
}

impl CountingVoteRepository {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    async fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VoteRepository for CountingVoteRepository {
    async fn save_vote(&self, vote: &Vote) -> Result<Vote, StoreError> {
        self.hit().await;
        self.inner.save_vote(vote).await
    }

    async fn update_vote(&self, vote: &Vote) -> Result<Vote, StoreError> {
        self.hit().await;
        self.inner.update_vote(vote).await
    }

    async fn find_vote_by_id(&self, vote_id: VoteId) -> Result<Option<Vote>, StoreError> {
        self.hit().await;
        self.inner.find_vote_by_id(vote_id).await
    }

    async fn find_votes_by_voter(&self, voter: &UserId) -> Result<Vec<Vote>, StoreError> {
        self.hit().await;
        self.inner.find_votes_by_voter(voter).await
    }

    async fn find_votes_by_voters(&self, voters: &[UserId]) -> Result<Vec<Vote>, StoreError> {
        self.hit().await;
        self.inner.find_votes_by_voters(voters).await
    }

    async fn find_user_vote_by_id(&self, id: UserVoteId) -> Result<Option<UserVote>, StoreError> {
        self.hit().await;
        self.inner.find_user_vote_by_id(id).await
    }

    async fn find_user_votes_by_target(&self, target: &UserId) -> Result<Vec<UserVote>, StoreError> {
        self.hit().await;
        self.inner.find_user_votes_by_target(target).await
    }

    async fn save_user_vote(&self, user_vote: &UserVote) -> Result<UserVote, StoreError> {
        self.hit().await;
        if self.fail_user_vote_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("user_votes insert refused".to_string()));
        }
        self.inner.save_user_vote(user_vote).await
    }

    async fn delete_vote(&self, vote_id: VoteId) -> Result<(), StoreError> {
        self.hit().await;
        if self.delete_concurrently.swap(false, Ordering::SeqCst) {
            self.inner.delete_vote(vote_id).await?;
        }
        self.inner.delete_vote(vote_id).await
    }

    async fn delete_user_vote(&self, id: UserVoteId) -> Result<(), StoreError> {
        self.hit().await;
        self.inner.delete_user_vote(id).await
    }
}

/// Cache storage counting calls, optionally failing reads or writes.
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorage,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub fail_reads: bool,
    pub fail_writes: bool,
}

impl CountingStorage {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStorage for CountingStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(CacheError::Unavailable("read refused".to_string()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(CacheError::Unavailable("write refused".to_string()));
        }
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        if self.fail_writes {
            return Err(CacheError::Unavailable("write refused".to_string()));
        }
        self.inner.delete(keys).await
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub clock: Arc<ManualClock>,
    pub users: Arc<CountingUserRepository>,
    pub votes: Arc<CountingVoteRepository>,
    pub storage: Arc<CountingStorage>,
    pub voting: Arc<VotingEngine>,
    pub service: UserService,
}

impl Harness {
    pub fn clock_now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

pub fn harness() -> Harness {
    harness_with_storage(CountingStorage::default())
}

pub fn harness_with_storage(storage: CountingStorage) -> Harness {
    harness_with(storage, CountingVoteRepository::default())
}

pub fn harness_with_votes(votes: CountingVoteRepository) -> Harness {
    harness_with(CountingStorage::default(), votes)
}

pub fn harness_with(storage: CountingStorage, votes: CountingVoteRepository) -> Harness {
    let clock = Arc::new(ManualClock::new());
    let users = Arc::new(CountingUserRepository::default());
    let votes = Arc::new(votes);
    let storage = Arc::new(storage);

    let voting = Arc::new(VotingEngine::new(
        votes.clone(),
        VoteCache::new(storage.clone(), TTL),
        clock.clone(),
    ));
    let service = UserService::new(
        users.clone(),
        UserCache::new(storage.clone(), TTL),
        voting.clone(),
        clock.clone(),
    )
    .with_hash_cost(4);

    Harness {
        clock,
        users,
        votes,
        storage,
        voting,
        service,
    }
}

pub fn new_user(nickname: &str) -> User {
    User::new(
        nickname,
        "First",
        "Last",
        format!("{nickname}@example.com"),
        "secret-password",
    )
}

/// A vote request from `voter` on `target`, in the shape the engine's
/// `vote` entry point takes.
pub fn request(voter: UserId, target: UserId, value: i32, at: DateTime<Utc>) -> (Vote, UserVote) {
    (Vote::new(value, voter, at), UserVote::new(target, 0))
}
