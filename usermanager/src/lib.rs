//! User Manager Library
//!
//! This library wires the user manager together: environment settings, the
//! composition root building stores, caches and services, and the REST
//! adapter translating HTTP requests into use case calls.

pub mod api;
pub mod config;
pub mod errors;

pub use config::{Dependencies, Settings};
pub use errors::AppError;
