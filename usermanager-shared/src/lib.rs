//! # User Manager Shared
//! This crate defines the data structures shared across the user manager
//! workspace: users, roles, votes, the user-vote join entity, page envelopes
//! and the pagination helper used to derive offsets and "has more" probes.
pub mod errors;
pub mod pagination;
pub mod types;

pub use errors::{CredentialError, PaginationError, PermissionError};
pub use pagination::PaginationQuery;
