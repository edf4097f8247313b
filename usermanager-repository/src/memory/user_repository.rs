use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use usermanager_shared::PaginationQuery;
use usermanager_shared::types::{User, UserId, Users};

use crate::{StoreError, UserRepository};

/// User store kept in memory, in insertion order.
#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn nickname_taken(users: &[User], nickname: &str, except: &UserId) -> bool {
    users
        .iter()
        .any(|u| u.deleted_at.is_none() && u.nickname == nickname && &u.user_id != except)
}

/// `ORDER BY created_at, updated_at` with PostgreSQL's nulls-last default.
fn listing_order(a: &User, b: &User) -> Ordering {
    a.created_at.cmp(&b.created_at).then_with(|| match (a.updated_at, b.updated_at) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    })
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| &u.user_id == user_id && u.deleted_at.is_none())
            .cloned())
    }

    async fn find_user_by_nickname(&self, nickname: &str) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| u.nickname == nickname && u.deleted_at.is_none())
            .cloned())
    }

    async fn get_users(&self, query: &PaginationQuery) -> Result<Users, StoreError> {
        let users = self.users.read().await;
        let mut active: Vec<User> = users.iter().filter(|u| u.deleted_at.is_none()).cloned().collect();
        active.sort_by(listing_order);

        let offset = usize::try_from(query.offset()).unwrap_or(0);
        let limit = usize::try_from(query.probe_limit()).unwrap_or(0);
        let rows = active.into_iter().skip(offset).take(limit).collect();
        Ok(query.paginate(rows))
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.user_id == user.user_id) {
            return Err(StoreError::UniqueViolation("users_pkey".to_string()));
        }
        if nickname_taken(&users, &user.nickname, &user.user_id) {
            return Err(StoreError::UniqueViolation("users_nickname_active_idx".to_string()));
        }

        let mut stored = user.clone();
        stored.votes.clear();
        users.push(stored.clone());
        Ok(stored)
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if nickname_taken(&users, &user.nickname, &user.user_id) {
            return Err(StoreError::UniqueViolation("users_nickname_active_idx".to_string()));
        }

        let stored = users
            .iter_mut()
            .find(|u| u.user_id == user.user_id && u.deleted_at.is_none())
            .ok_or_else(|| StoreError::not_found("user", user.user_id))?;
        stored.nickname = user.nickname.clone();
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.email = user.email.clone();
        stored.password = user.password.clone();
        stored.is_public = user.is_public;
        stored.role = user.role;
        stored.updated_at = user.updated_at;
        stored.login_date = user.login_date;
        Ok(stored.clone())
    }

    async fn soft_delete_user(
        &self,
        user_id: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        let stored = users
            .iter_mut()
            .find(|u| &u.user_id == user_id && u.deleted_at.is_none())
            .ok_or_else(|| StoreError::not_found("user", user_id))?;
        stored.deleted_at = Some(deleted_at);
        Ok(stored.clone())
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| &u.user_id != user_id);
        if users.len() == before {
            return Err(StoreError::not_found("user", user_id));
        }
        Ok(())
    }
}
