mod models;
mod oauth;

pub use models::{AgentConfig, AgentError, Flow};

use async_trait::async_trait;
use chrono::Utc;
use oncat_api::endpoints::{facilities::Facility, instruments::Instrument};
use oncat_api::{Client, Request};
use secrecy::SecretString;

use crate::client::{Settings, TokenStore};
use crate::common::Token;
use crate::error::AuthError;
use oauth::OAuthExchange;

/// Reads the persisted token, if any.
pub type TokenGetter = Box<dyn Fn() -> Option<Token> + Send + Sync>;
/// Persists a freshly issued or refreshed token.
pub type TokenSetter = Box<dyn Fn(&Token) -> Result<(), AuthError> + Send + Sync>;

/// Everything the login widget needs from an ONCat client.
///
/// `OncatAgent` talks to the real service; tests substitute a fake.
#[async_trait]
pub trait SessionAgent: Send + Sync {
    /// Exchange credentials for a token and hand it to the token setter.
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), AgentError>;

    async fn list_facilities(&self) -> Result<Vec<Facility>, AgentError>;

    async fn list_instruments(&self, facility: &str) -> Result<Vec<Instrument>, AgentError>;
}

pub struct OncatAgent {
    config: AgentConfig,
    oauth: OAuthExchange,
    token_getter: TokenGetter,
    token_setter: TokenSetter,
}

impl OncatAgent {
    pub fn new(
        config: AgentConfig,
        token_getter: TokenGetter,
        token_setter: TokenSetter,
    ) -> Result<Self, AuthError> {
        let oauth = OAuthExchange::new(&config)?;

        Ok(Self {
            config,
            oauth,
            token_getter,
            token_setter,
        })
    }

    /// Agent for `identity_key`, backed by its token file and the client id
    /// configured as `{identity_key}_id`.
    pub fn for_identity(identity_key: &str, settings: &Settings) -> Result<Self, AuthError> {
        let store = TokenStore::new(identity_key)?;
        Self::with_store(identity_key, settings, &store)
    }

    pub fn with_store(
        identity_key: &str,
        settings: &Settings,
        store: &TokenStore,
    ) -> Result<Self, AuthError> {
        let client_id =
            settings
                .client_id(identity_key)
                .ok_or_else(|| AuthError::ConfigurationMissing {
                    key: identity_key.to_string(),
                })?;

        let config = AgentConfig::new(settings.oncat_url(), client_id);
        Self::new(config, store.token_getter(), store.token_setter())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Current access token, refreshing it first when it is about to expire.
    async fn access_token(&self) -> Result<String, AgentError> {
        let token = (self.token_getter)().ok_or(AgentError::LoginRequired)?;

        let token = if token.is_expired(Utc::now()) {
            let refresh_token = token.refresh_token().ok_or(AgentError::LoginRequired)?;
            let refreshed = self
                .oauth
                .exchange_refresh_token(refresh_token)
                .await?
                .inherit_refresh_token(&token);
            (self.token_setter)(&refreshed)?;
            tracing::info!("Access token refreshed");
            refreshed
        } else {
            token
        };

        token
            .access_token()
            .map(str::to_string)
            .ok_or(AgentError::LoginRequired)
    }

    async fn client(&self) -> Result<Client, AgentError> {
        let access_token = self.access_token().await?;
        Ok(Client::new(&self.config.url, &access_token))
    }
}

#[async_trait]
impl SessionAgent for OncatAgent {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), AgentError> {
        use secrecy::ExposeSecret;

        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AgentError::LoginRequired);
        }

        let token = self.oauth.exchange_password(username, password).await?;
        (self.token_setter)(&token)?;

        tracing::info!(username = %username, "Logged in to ONCat");
        Ok(())
    }

    async fn list_facilities(&self) -> Result<Vec<Facility>, AgentError> {
        let client = self.client().await?;
        Ok(client.send(Request::facilities().list()).await?)
    }

    async fn list_instruments(&self, facility: &str) -> Result<Vec<Instrument>, AgentError> {
        let client = self.client().await?;
        Ok(client
            .send(Request::instruments().list().facility(facility))
            .await?)
    }
}
