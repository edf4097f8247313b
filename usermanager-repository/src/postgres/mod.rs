//! PostgreSQL implementation of the user and vote stores.
//!
//! ## Database Tables
//!
//! - `users`: User profiles, soft-deleted rows keep their data with `deleted_at` set
//! - `vote`: Individual vote events keyed by the voter (`created_user_id`)
//! - `user_votes`: Join rows linking the target user to a vote
mod user_repository;
mod vote_repository;

pub use user_repository::PostgresUserRepository;
pub use vote_repository::PostgresVoteRepository;

use crate::errors::StoreError;

/// Embedded schema migrations, applied by the binary on startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./src/postgres/migrations");

/// Maps unique-key violations to [`StoreError::UniqueViolation`]; every other
/// error stays a database error.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::UniqueViolation(
                db_err.constraint().unwrap_or("unique").to_string(),
            );
        }
    }
    StoreError::from(err)
}
