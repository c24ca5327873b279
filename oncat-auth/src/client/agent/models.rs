use crate::error::AuthError;
use oncat_api::OncatApiError;
use thiserror::Error;

/// OAuth flow the agent negotiates with ONCat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Flow {
    /// Username and password exchanged directly for a token
    #[default]
    ResourceOwnerCredentials,
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub url: String,
    pub client_id: String,
    pub flow: Flow,
}

impl AgentConfig {
    pub fn new(url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client_id: client_id.into(),
            flow: Flow::ResourceOwnerCredentials,
        }
    }

    pub(crate) fn token_endpoint(&self) -> String {
        format!("{}/oauth/token", self.url.trim_end_matches('/'))
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    /// The server rejected the username/password pair
    #[error("Invalid username or password")]
    InvalidGrant,
    /// No credentials, or no usable token to act on
    #[error("Login required")]
    LoginRequired,
    /// The stored refresh token was rejected
    #[error("Refresh token is invalid or expired")]
    InvalidRefreshToken,
    #[error("OAuth error: {0}")]
    OAuth(String),
    #[error("ONCat API error: {0}")]
    Api(#[source] OncatApiError),
    #[error("Could not persist token: {0}")]
    Storage(#[source] AuthError),
}

impl From<OncatApiError> for AgentError {
    fn from(err: OncatApiError) -> Self {
        if err.is_unauthorized() {
            Self::LoginRequired
        } else {
            Self::Api(err)
        }
    }
}

impl From<AuthError> for AgentError {
    fn from(err: AuthError) -> Self {
        Self::Storage(err)
    }
}
