pub mod agent;
mod config;
mod token_storage;

pub use config::{ConfigValue, Settings};
pub use token_storage::{validate_identity_key, TokenStore};
