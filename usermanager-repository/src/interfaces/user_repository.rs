//! This module defines the `UserRepository` trait, the durable store for user
//! accounts.
use chrono::{DateTime, Utc};
use usermanager_shared::PaginationQuery;
use usermanager_shared::types::{User, UserId, Users};

use crate::errors::StoreError;

/// A trait that defines the interface for the durable user store.
///
/// Implementors run one statement per call; callers must not assume
/// atomicity across two calls. Soft-deleted users are invisible to every
/// read.
#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    /// Looks up a user by identity. `Ok(None)` when no such user exists.
    async fn find_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError>;

    /// Looks up a user by nickname (case-sensitive).
    async fn find_user_by_nickname(&self, nickname: &str) -> Result<Option<User>, StoreError>;

    /// Returns one page of users ordered by creation time.
    ///
    /// Implementations fetch `query.probe_limit()` rows and build the page
    /// with [`PaginationQuery::paginate`].
    ///
    /// # Arguments
    ///
    /// * `query` - Page number and size. Offsets are taken from
    ///   [`PaginationQuery::offset`].
    ///
    /// # Returns
    ///
    /// The page's users with `has_more` set when a later page exists.
    async fn get_users(&self, query: &PaginationQuery) -> Result<Users, StoreError>;

    /// Inserts a new user.
    ///
    /// # Arguments
    ///
    /// * `user` - The fully built user, identity included.
    ///
    /// # Returns
    ///
    /// The stored user. A nickname held by another active user fails with
    /// [`StoreError::UniqueViolation`].
    async fn save_user(&self, user: &User) -> Result<User, StoreError>;

    /// Persists the mutable profile fields of an existing user.
    ///
    /// Fails with [`StoreError::NotFound`] when `user.user_id` matches no
    /// active row.
    async fn update_user(&self, user: &User) -> Result<User, StoreError>;

    /// Marks an active user deleted.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user to hide from reads.
    /// * `deleted_at` - Timestamp stored in the `deleted_at` column.
    ///
    /// # Returns
    ///
    /// The updated row, or [`StoreError::NotFound`] when no active user
    /// matched.
    async fn soft_delete_user(
        &self,
        user_id: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<User, StoreError>;

    /// Removes the user row. Fails with [`StoreError::NotFound`] when no row
    /// was affected.
    async fn delete_user(&self, user_id: &UserId) -> Result<(), StoreError>;
}
