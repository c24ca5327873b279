// Common types shared by the store and the agent
pub mod common;

// Client library (public API for oncat-login)
mod client;
mod error;

pub use client::agent::{
    AgentConfig, AgentError, Flow, OncatAgent, SessionAgent, TokenGetter, TokenSetter,
};
pub use client::{validate_identity_key, ConfigValue, Settings, TokenStore};
pub use common::Token;
pub use error::AuthError;
pub use oncat_api::endpoints::{facilities::Facility, instruments::Instrument};
pub use secrecy::SecretString;
