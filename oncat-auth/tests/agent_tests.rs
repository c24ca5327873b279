use chrono::{Duration, Utc};
use oncat_auth::{AgentError, AuthError, OncatAgent, SecretString, SessionAgent, Settings, TokenStore};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings_for(server: &MockServer) -> Settings {
    Settings::from_toml_str(&format!(
        "[login.oncat]\noncat_url = \"{}\"\ntest_id = \"test-client\"\n",
        server.uri()
    ))
    .unwrap()
}

fn agent_for(server: &MockServer) -> (TempDir, TokenStore, OncatAgent) {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::with_base_dir(dir.path(), "test").unwrap();
    let agent = OncatAgent::with_store("test", &settings_for(server), &store).unwrap();
    (dir, store, agent)
}

fn password(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

async fn mount_password_grant(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=password"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=correct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-access",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "fresh-refresh"
        })))
        .mount(server)
        .await;
}

async fn mount_invalid_grant(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid credentials given."
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn login_persists_token_and_authenticates_calls() {
    let server = MockServer::start().await;
    mount_password_grant(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/facilities"))
        .and(header("authorization", "Bearer fresh-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "SNS", "name": "SNS" },
            { "id": "HFIR", "name": "HFIR" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, agent) = agent_for(&server);
    agent.login("alice", &password("correct")).await.unwrap();

    let token = store.read_token().expect("token written by setter");
    assert_eq!(token.access_token(), Some("fresh-access"));
    assert_eq!(token.refresh_token(), Some("fresh-refresh"));
    assert!(token.expires_at().is_some());

    let facilities = agent.list_facilities().await.unwrap();
    assert_eq!(facilities.len(), 2);
}

#[tokio::test]
async fn rejected_credentials_are_invalid_grant() {
    let server = MockServer::start().await;
    mount_invalid_grant(&server).await;

    let (_dir, store, agent) = agent_for(&server);
    let err = agent.login("alice", &password("wrong")).await.unwrap_err();

    assert!(matches!(err, AgentError::InvalidGrant));
    assert!(store.read_token().is_none());
}

#[tokio::test]
async fn empty_credentials_never_reach_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, _store, agent) = agent_for(&server);

    let err = agent.login("alice", &password("")).await.unwrap_err();
    assert!(matches!(err, AgentError::LoginRequired));

    let err = agent.login("", &password("secret")).await.unwrap_err();
    assert!(matches!(err, AgentError::LoginRequired));
}

#[tokio::test]
async fn calls_without_token_require_login() {
    let server = MockServer::start().await;
    let (_dir, _store, agent) = agent_for(&server);

    let err = agent.list_facilities().await.unwrap_err();
    assert!(matches!(err, AgentError::LoginRequired));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=old-refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "renewed-access",
            "token_type": "bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/instruments"))
        .and(query_param("facility", "HFIR"))
        .and(header("authorization", "Bearer renewed-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "CG1D", "name": "IMAGING", "facility": "HFIR" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, store, agent) = agent_for(&server);
    let stale = serde_json::from_value(json!({
        "access_token": "old-access",
        "refresh_token": "old-refresh",
        "expires_at": (Utc::now() - Duration::hours(1)).timestamp()
    }))
    .unwrap();
    store.write_token(&stale).unwrap();

    let instruments = agent.list_instruments("HFIR").await.unwrap();
    assert_eq!(instruments[0].name, "IMAGING");

    let saved = store.read_token().unwrap();
    assert_eq!(saved.access_token(), Some("renewed-access"));
    assert_eq!(saved.refresh_token(), Some("old-refresh"));
}

#[tokio::test]
async fn rejected_refresh_token_is_reported() {
    let server = MockServer::start().await;
    mount_invalid_grant(&server).await;

    let (_dir, store, agent) = agent_for(&server);
    let stale = serde_json::from_value(json!({
        "access_token": "old-access",
        "refresh_token": "revoked",
        "expires_at": (Utc::now() - Duration::hours(1)).timestamp()
    }))
    .unwrap();
    store.write_token(&stale).unwrap();

    let err = agent.list_facilities().await.unwrap_err();
    assert!(matches!(err, AgentError::InvalidRefreshToken));
}

#[tokio::test]
async fn unauthorized_api_response_requires_login() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/facilities"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "Unauthorized" })))
        .mount(&server)
        .await;

    let (_dir, store, agent) = agent_for(&server);
    let token = serde_json::from_value(json!({ "access_token": "revoked" })).unwrap();
    store.write_token(&token).unwrap();

    let err = agent.list_facilities().await.unwrap_err();
    assert!(matches!(err, AgentError::LoginRequired));
}

#[test]
fn unknown_identity_has_no_client_id() {
    let dir = TempDir::new().unwrap();
    let store = TokenStore::with_base_dir(dir.path(), "nobody").unwrap();
    let settings = Settings::from_toml_str("[login.oncat]\ntest_id = \"test-client\"").unwrap();

    let result = OncatAgent::with_store("nobody", &settings, &store);

    match result {
        Err(AuthError::ConfigurationMissing { key }) => assert_eq!(key, "nobody"),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("agent built without a client id"),
    }
}
