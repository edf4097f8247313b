//! PostgreSQL implementation of the user store.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use usermanager_shared::PaginationQuery;
use usermanager_shared::types::{Role, User, UserId, Users};

use super::map_write_error;
use crate::{StoreError, UserRepository};

const USER_COLUMNS: &str = "user_id, nickname, first_name, last_name, email, password, is_public, \
     user_role, created_by, created_at, updated_at, deleted_at, login_date";

/// PostgreSQL-backed user store.
pub struct PostgresUserRepository {
    pool: sqlx::PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository over a pool whose schema has been migrated
    /// with [`MIGRATOR`](crate::MIGRATOR).
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: UserId,
    nickname: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    is_public: bool,
    user_role: String,
    created_by: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    login_date: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .user_role
            .parse::<Role>()
            .map_err(|e| StoreError::InvalidRow(e.to_string()))?;
        Ok(User {
            user_id: row.user_id,
            nickname: row.nickname,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password: row.password,
            is_public: row.is_public,
            role,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
            login_date: row.login_date,
            votes: Vec::new(),
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_id(&self, user_id: &UserId) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_nickname(&self, nickname: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE nickname = $1 AND deleted_at IS NULL");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    async fn get_users(&self, query: &PaginationQuery) -> Result<Users, StoreError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE deleted_at IS NULL \
             ORDER BY created_at, updated_at OFFSET $1 LIMIT $2"
        );
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(query.offset())
            .bind(query.probe_limit().max(0))
            .fetch_all(&self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(User::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(query.paginate(users))
    }

    async fn save_user(&self, user: &User) -> Result<User, StoreError> {
        sqlx::query(
            "INSERT INTO users (user_id, nickname, first_name, last_name, email, password, is_public, \
             user_role, created_by, created_at, updated_at, deleted_at, login_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(user.user_id)
        .bind(&user.nickname)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.is_public)
        .bind(user.role.as_str())
        .bind(user.created_by)
        .bind(user.created_at)
        .bind(user.updated_at)
        .bind(user.deleted_at)
        .bind(user.login_date)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(user.clone())
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET nickname = $1, first_name = $2, last_name = $3, email = $4, password = $5, \
             is_public = $6, user_role = $7, updated_at = $8, login_date = $9 \
             WHERE user_id = $10 AND deleted_at IS NULL RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.nickname)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.is_public)
            .bind(user.role.as_str())
            .bind(user.updated_at)
            .bind(user.login_date)
            .bind(user.user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| StoreError::not_found("user", user.user_id))?;

        User::try_from(row)
    }

    async fn soft_delete_user(
        &self,
        user_id: &UserId,
        deleted_at: DateTime<Utc>,
    ) -> Result<User, StoreError> {
        let sql = format!(
            "UPDATE users SET deleted_at = $1 WHERE user_id = $2 AND deleted_at IS NULL \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(deleted_at)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::not_found("user", user_id))?;

        User::try_from(row)
    }

    async fn delete_user(&self, user_id: &UserId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("user", user_id));
        }
        Ok(())
    }
}
