//! In-process implementations of the user and vote stores.
//!
//! They mirror the PostgreSQL semantics (unique active nicknames, soft delete
//! visibility, vote ordering, `NotFound` on zero-row mutations) and back the
//! `memory` store backend as well as the test suites.
mod user_repository;
mod vote_repository;

pub use user_repository::MemoryUserRepository;
pub use vote_repository::MemoryVoteRepository;
