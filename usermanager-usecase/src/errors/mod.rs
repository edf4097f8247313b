//! Error types for the user manager use cases.
mod kind;
mod usecase;

pub use kind::ErrorKind;
pub use usecase::UsecaseError;
