//! The user service.
//!
//! Reads go through the cache first and fall back to the store on a miss,
//! writing the store result back with the configured TTL. A store miss is
//! returned as `Ok(None)` and never cached. Cache write failures are logged
//! and swallowed since the store remains the source of truth; cache read
//! failures are returned to the caller.
use std::sync::Arc;

use usermanager_repository::{StoreError, UserCache, UserRepository};
use usermanager_shared::types::{Role, User, UserId, Users, DEFAULT_HASH_COST};
use usermanager_shared::{CredentialError, PaginationQuery};
use uuid::Uuid;

use crate::{Clock, UsecaseError, VoteOutcome, VotingEngine};

pub struct UserService {
    users: Arc<dyn UserRepository>,
    cache: UserCache,
    voting: Arc<VotingEngine>,
    clock: Arc<dyn Clock>,
    hash_cost: u32,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        cache: UserCache,
        voting: Arc<VotingEngine>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            cache,
            voting,
            clock,
            hash_cost: DEFAULT_HASH_COST,
        }
    }

    /// Overrides the bcrypt cost of new credentials.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub fn voting(&self) -> &Arc<VotingEngine> {
        &self.voting
    }

    /// Creates a user. Identity, creation time and role are assigned here and
    /// the credential is hashed before it is stored.
    pub async fn create_user(&self, mut user: User) -> Result<User, UsecaseError> {
        user.user_id = Uuid::new_v4();
        user.created_at = self.clock.now();
        user.role = Role::default();
        user.updated_at = None;
        user.deleted_at = None;
        user.login_date = None;
        user.votes.clear();

        let existing = self
            .users
            .find_user_by_nickname(&user.nickname)
            .await
            .map_err(UsecaseError::store("create_user.find_user_by_nickname"))?;
        if existing.is_some() {
            return Err(UsecaseError::DuplicateNickname(user.nickname));
        }

        let cost = self.hash_cost;
        let user = tokio::task::spawn_blocking(move || {
            user.hash_password_with_cost(cost).map(|()| user)
        })
        .await
        .map_err(UsecaseError::task("create_user.hash_password"))?
        .map_err(UsecaseError::credential("create_user.hash_password"))?;

        let saved = match self.users.save_user(&user).await {
            Ok(saved) => saved,
            Err(StoreError::UniqueViolation(_)) => {
                return Err(UsecaseError::DuplicateNickname(user.nickname));
            }
            Err(e) => return Err(UsecaseError::store("create_user.save_user")(e)),
        };

        tracing::info!(user_id = %saved.user_id, nickname = %saved.nickname, "User created");
        Ok(saved)
    }

    /// Persists the profile fields of an existing user and stamps `updated_at`.
    ///
    /// Permission and role elevation checks belong to the caller.
    pub async fn update_user(&self, mut user: User) -> Result<User, UsecaseError> {
        let current = self
            .users
            .find_user_by_id(&user.user_id)
            .await
            .map_err(UsecaseError::store("update_user.find_user_by_id"))?
            .ok_or(UsecaseError::UserNotFound(user.user_id))?;

        user.updated_at = Some(self.clock.now());
        let updated = match self.users.update_user(&user).await {
            Ok(updated) => updated,
            Err(StoreError::UniqueViolation(_)) => {
                return Err(UsecaseError::DuplicateNickname(user.nickname));
            }
            Err(e) => return Err(UsecaseError::store("update_user.update_user")(e)),
        };

        self.invalidate(&updated.user_id, &[current.nickname.as_str(), updated.nickname.as_str()])
            .await;
        tracing::info!(user_id = %updated.user_id, "User updated");
        Ok(updated)
    }

    /// Removes a user. Fails with a not-found store error when no row existed.
    pub async fn delete_user(&self, user_id: &UserId) -> Result<(), UsecaseError> {
        let current = self
            .users
            .find_user_by_id(user_id)
            .await
            .map_err(UsecaseError::store("delete_user.find_user_by_id"))?;

        self.users
            .delete_user(user_id)
            .await
            .map_err(UsecaseError::store("delete_user.delete_user"))?;

        let nicknames: Vec<&str> = current.iter().map(|user| user.nickname.as_str()).collect();
        self.invalidate(user_id, &nicknames).await;
        tracing::info!(%user_id, "User deleted");
        Ok(())
    }

    /// Marks a user deleted. The user disappears from every read.
    pub async fn soft_delete_user(&self, user_id: &UserId) -> Result<User, UsecaseError> {
        let deleted = self
            .users
            .soft_delete_user(user_id, self.clock.now())
            .await
            .map_err(UsecaseError::store("soft_delete_user.soft_delete_user"))?;

        self.invalidate(user_id, &[deleted.nickname.as_str()]).await;
        tracing::info!(%user_id, "User soft-deleted");
        Ok(deleted)
    }

    /// Cache-aside lookup by identity.
    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, UsecaseError> {
        if let Some(user) = self
            .cache
            .get_user(user_id)
            .await
            .map_err(UsecaseError::cache("get_user.cache_get"))?
        {
            tracing::debug!(%user_id, "User cache hit");
            return Ok(Some(user));
        }

        let Some(user) = self
            .users
            .find_user_by_id(user_id)
            .await
            .map_err(UsecaseError::store("get_user.find_user_by_id"))?
        else {
            return Ok(None);
        };

        if let Err(e) = self.cache.set_user(&user).await {
            tracing::warn!(%user_id, error = %e, "Failed to cache user");
        }
        Ok(Some(user))
    }

    /// [`get_user`](Self::get_user) with the user's vote history attached.
    pub async fn get_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, UsecaseError> {
        let Some(mut user) = self.get_user(user_id).await? else {
            return Ok(None);
        };
        user.votes = self.voting.find_votes_for_user(&user.user_id).await?;
        Ok(Some(user))
    }

    /// Cache-aside lookup by nickname.
    pub async fn get_user_by_nickname(&self, nickname: &str) -> Result<Option<User>, UsecaseError> {
        if let Some(user) = self
            .cache
            .get_user_by_nickname(nickname)
            .await
            .map_err(UsecaseError::cache("get_user_by_nickname.cache_get"))?
        {
            tracing::debug!(nickname, "User cache hit");
            return Ok(Some(user));
        }

        let Some(user) = self
            .users
            .find_user_by_nickname(nickname)
            .await
            .map_err(UsecaseError::store("get_user_by_nickname.find_user_by_nickname"))?
        else {
            return Ok(None);
        };

        if let Err(e) = self.cache.set_user_by_nickname(&user).await {
            tracing::warn!(nickname, error = %e, "Failed to cache user");
        }
        Ok(Some(user))
    }

    /// Cache-aside page of users.
    pub async fn get_users(&self, query: &PaginationQuery) -> Result<Users, UsecaseError> {
        if let Some(users) = self
            .cache
            .get_users(query)
            .await
            .map_err(UsecaseError::cache("get_users.cache_get"))?
        {
            tracing::debug!(page = query.page, size = query.size, "Users page cache hit");
            return Ok(users);
        }

        let users = self
            .users
            .get_users(query)
            .await
            .map_err(UsecaseError::store("get_users.get_users"))?;

        if let Err(e) = self.cache.set_users(query, &users).await {
            tracing::warn!(page = query.page, error = %e, "Failed to cache users page");
        }
        Ok(users)
    }

    /// [`get_users`](Self::get_users) with each user's votes attached.
    pub async fn get_users_by_pagination_query(
        &self,
        query: &PaginationQuery,
    ) -> Result<Users, UsecaseError> {
        let mut users = self.get_users(query).await?;
        let items = std::mem::take(&mut users.items);
        users.items = self.voting.load_votes_to_users(items).await?;
        Ok(users)
    }

    /// Succeeds when the nickname of `user` is free or already owned by the
    /// same user.
    pub async fn check_user_by_nickname(&self, user: &User) -> Result<(), UsecaseError> {
        let holder = self
            .users
            .find_user_by_nickname(&user.nickname)
            .await
            .map_err(UsecaseError::store("check_user_by_nickname.find_user_by_nickname"))?;

        match holder {
            Some(holder) if holder.user_id != user.user_id => {
                Err(UsecaseError::DuplicateNickname(user.nickname.clone()))
            }
            _ => Ok(()),
        }
    }

    /// Checks a credential and stamps `login_date` on success. Unknown
    /// nicknames and wrong passwords fail alike with `InvalidCredentials`.
    pub async fn authenticate(&self, nickname: &str, password: &str) -> Result<User, UsecaseError> {
        let user = self
            .users
            .find_user_by_nickname(nickname)
            .await
            .map_err(UsecaseError::store("authenticate.find_user_by_nickname"))?
            .ok_or(UsecaseError::InvalidCredentials)?;

        let candidate = password.to_string();
        let (mut user, verified) = tokio::task::spawn_blocking(move || {
            let verified = user.verify_password(&candidate);
            (user, verified)
        })
        .await
        .map_err(UsecaseError::task("authenticate.verify_password"))?;
        match verified {
            Ok(()) => {}
            Err(CredentialError::Mismatch) => return Err(UsecaseError::InvalidCredentials),
            Err(e) => return Err(UsecaseError::credential("authenticate.verify_password")(e)),
        }

        user.login_date = Some(self.clock.now());
        let user = self
            .users
            .update_user(&user)
            .await
            .map_err(UsecaseError::store("authenticate.update_user"))?;

        self.invalidate(&user.user_id, &[user.nickname.as_str()]).await;
        tracing::info!(user_id = %user.user_id, "User authenticated");
        Ok(user)
    }

    /// Casts a vote from `voter` on `target` after checking the target exists.
    pub async fn vote_for_user(
        &self,
        voter: UserId,
        target: UserId,
        value: i32,
    ) -> Result<VoteOutcome, UsecaseError> {
        if voter == target {
            return Err(UsecaseError::SelfVote);
        }
        if self.get_user(&target).await?.is_none() {
            return Err(UsecaseError::UserNotFound(target));
        }
        self.voting.cast(voter, target, value).await
    }

    async fn invalidate(&self, user_id: &UserId, nicknames: &[&str]) {
        if let Err(e) = self.cache.invalidate_user(user_id, nicknames).await {
            tracing::warn!(%user_id, error = %e, "Failed to invalidate user cache");
        }
    }
}
