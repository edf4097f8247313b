//! User profile use cases.
mod service;

pub use service::UserService;
