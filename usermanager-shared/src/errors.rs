//! Error types raised by the shared domain helpers.
use std::num::ParseIntError;

use thiserror::Error;

/// Raised when raw page/size query parameters cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Invalid {field} value {value:?}: {source}")]
    Parse {
        field: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Raised by the one-way credential helpers.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Password does not match")]
    Mismatch,
}

/// Raised when an actor lacks the role required for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("Auth user can't {0} this user")]
    Denied(&'static str),

    #[error("Only an admin can grant the {0} role")]
    RoleElevation(&'static str),

    #[error("Unknown role: {0}")]
    UnknownRole(String),
}
