//! Configuration module for the User Manager.
//! Reads settings from the environment and wires the application dependencies.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::{LogFormat, Settings, StoreBackend};
