//! # User Manager Repository
//! This crate provides the storage and cache collaborators of the user
//! manager. It includes the repository and cache interfaces, their error
//! types, and concrete implementations for PostgreSQL, Redis and in-process
//! memory.
pub mod cache;
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use cache::{CacheSource, MemoryStorage, RedisStorage, UserCache, VoteCache, DEFAULT_CACHE_TTL};
pub use errors::{CacheError, StoreError};
pub use interfaces::{CacheStorage, UserRepository, VoteRepository};
pub use memory::{MemoryUserRepository, MemoryVoteRepository};
pub use postgres::{PostgresUserRepository, PostgresVoteRepository, MIGRATOR};
