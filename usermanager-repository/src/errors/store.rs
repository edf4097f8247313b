//! Error types for the relational store.
use thiserror::Error;

/// Represents errors that can occur within a user or vote store.
///
/// Lookups report "no row" as `Ok(None)`; `NotFound` is reserved for
/// mutations that were expected to affect a row and affected none.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[source] sqlx::Error),

    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    /// No connection could be checked out of the pool.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                Self::Unavailable(err.to_string())
            }
            other => Self::DatabaseError(other),
        }
    }
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_exhaustion_maps_to_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn other_driver_errors_stay_database_errors() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::DatabaseError(_)
        ));
    }
}
