use std::sync::Arc;
use std::time::Duration;

use usermanager_shared::PaginationQuery;
use usermanager_shared::types::{User, UserId, Users};

use super::{get_json, set_json};
use crate::{CacheError, CacheStorage};

/// Typed cache for user profiles and user pages.
///
/// Keys:
/// - `user:id:<uuid>`
/// - `user:nickname:<nickname>`
/// - `user:page:<json pagination query>`
#[derive(Clone)]
pub struct UserCache {
    storage: Arc<dyn CacheStorage>,
    ttl: Duration,
}

impl UserCache {
    pub fn new(storage: Arc<dyn CacheStorage>, ttl: Duration) -> Self {
        Self { storage, ttl }
    }

    pub fn id_key(user_id: &UserId) -> String {
        format!("user:id:{user_id}")
    }

    pub fn nickname_key(nickname: &str) -> String {
        format!("user:nickname:{nickname}")
    }

    pub fn page_key(query: &PaginationQuery) -> Result<String, CacheError> {
        Ok(format!("user:page:{}", serde_json::to_string(query)?))
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<User>, CacheError> {
        get_json(self.storage.as_ref(), &Self::id_key(user_id)).await
    }

    pub async fn set_user(&self, user: &User) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::id_key(&user.user_id), user, self.ttl).await
    }

    pub async fn get_user_by_nickname(&self, nickname: &str) -> Result<Option<User>, CacheError> {
        get_json(self.storage.as_ref(), &Self::nickname_key(nickname)).await
    }

    pub async fn set_user_by_nickname(&self, user: &User) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::nickname_key(&user.nickname), user, self.ttl).await
    }

    pub async fn get_users(&self, query: &PaginationQuery) -> Result<Option<Users>, CacheError> {
        get_json(self.storage.as_ref(), &Self::page_key(query)?).await
    }

    pub async fn set_users(&self, query: &PaginationQuery, users: &Users) -> Result<(), CacheError> {
        set_json(self.storage.as_ref(), &Self::page_key(query)?, users, self.ttl).await
    }

    /// Drops the id key and the nickname keys of a user. Pass every nickname
    /// the user has been cached under.
    pub async fn invalidate_user(&self, user_id: &UserId, nicknames: &[&str]) -> Result<(), CacheError> {
        let mut keys = vec![Self::id_key(user_id)];
        keys.extend(nicknames.iter().map(|nickname| Self::nickname_key(nickname)));
        self.storage.delete(&keys).await
    }
}
