use chrono::Utc;
use oauth2::{
    basic::{BasicClient, BasicErrorResponseType, BasicTokenResponse},
    ClientId, HttpRequest, HttpResponse, RefreshToken, RequestTokenError, ResourceOwnerPassword,
    ResourceOwnerUsername, StandardErrorResponse, TokenUrl,
};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use super::models::{AgentConfig, AgentError};
use crate::common::Token;
use crate::error::AuthError;

type TokenRequestError =
    RequestTokenError<reqwest::Error, StandardErrorResponse<BasicErrorResponseType>>;

// Simple async HTTP client for OAuth2
async fn http_client(request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
    let client = reqwest::Client::new();
    let mut builder = client
        .request(request.method().clone(), request.uri().to_string())
        .body(request.body().clone());

    for (name, value) in request.headers() {
        builder = builder.header(name.as_str(), value.as_bytes());
    }

    let response = builder.send().await?;
    let status = response.status();
    let body = response.bytes().await?.to_vec();

    let mut http_response = HttpResponse::new(body);
    *http_response.status_mut() = status;

    Ok(http_response)
}

/// Token endpoint calls for a public client (no secret).
pub(crate) struct OAuthExchange {
    client_id: String,
    token_url: TokenUrl,
}

impl OAuthExchange {
    pub(crate) fn new(config: &AgentConfig) -> Result<Self, AuthError> {
        let token_url = TokenUrl::new(config.token_endpoint())
            .map_err(|e| AuthError::Configuration(format!("Invalid token URL: {}", e)))?;

        Ok(Self {
            client_id: config.client_id.clone(),
            token_url,
        })
    }

    /// Resource-owner-credentials grant
    pub(crate) async fn exchange_password(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Token, AgentError> {
        let username = ResourceOwnerUsername::new(username.to_string());
        let password = ResourceOwnerPassword::new(password.expose_secret().to_string());

        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_token_uri(self.token_url.clone())
            .exchange_password(&username, &password)
            .request_async(&http_client)
            .await
            .map_err(|e| classify(e, AgentError::InvalidGrant))?;

        tracing::debug!("Exchanged credentials for tokens");
        into_token(&token_result)
    }

    pub(crate) async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Token, AgentError> {
        let token_result = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_token_uri(self.token_url.clone())
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| classify(e, AgentError::InvalidRefreshToken))?;

        tracing::debug!("Refreshed tokens");
        into_token(&token_result)
    }
}

/// `invalid_grant` means the presented grant was rejected; everything else
/// is a generic OAuth failure.
fn classify(err: TokenRequestError, on_invalid_grant: AgentError) -> AgentError {
    match &err {
        RequestTokenError::ServerResponse(response)
            if matches!(response.error(), BasicErrorResponseType::InvalidGrant) =>
        {
            on_invalid_grant
        }
        _ => AgentError::OAuth(format!("Token request failed: {}", err)),
    }
}

fn into_token(response: &BasicTokenResponse) -> Result<Token, AgentError> {
    match serde_json::to_value(response) {
        Ok(Value::Object(fields)) => Ok(Token::issued(fields, Utc::now())),
        Ok(_) => Err(AgentError::OAuth(
            "Token response is not a JSON object".to_string(),
        )),
        Err(e) => Err(AgentError::OAuth(format!("Invalid token response: {}", e))),
    }
}
