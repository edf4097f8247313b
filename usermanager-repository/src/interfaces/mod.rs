//! This module defines and re-exports the interfaces for the store and cache
//! collaborators. The use case layer depends on these traits only.
mod cache_storage;
mod user_repository;
mod vote_repository;

pub use cache_storage::CacheStorage;
pub use user_repository::UserRepository;
pub use vote_repository::VoteRepository;
