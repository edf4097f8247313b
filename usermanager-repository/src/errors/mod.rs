//! Error types for the user manager repositories.
//! Consolidates and re-exports the store and cache error types.
mod cache;
mod store;

pub use cache::CacheError;
pub use store::StoreError;
