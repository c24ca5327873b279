use async_trait::async_trait;
use oncat_auth::{
    AgentError, Facility, Instrument, SecretString, SessionAgent, Token, TokenStore,
};
use secrecy::ExposeSecret;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::login::{LoginForm, LoginOptions};
use crate::prompt::{CredentialPrompt, PromptAction};

/// How the fake's facility probe should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeFailure {
    InvalidRefreshToken,
    LoginRequired,
    Network,
}

/// In-memory stand-in for the ONCat agent (no network).
///
/// Accepts exactly one username/password pair. When given a token store it
/// writes a token there on successful login, like the real agent's setter.
pub struct FakeAgent {
    username: String,
    password: String,
    logged_in: AtomicBool,
    probe_failure: Mutex<Option<ProbeFailure>>,
    login_failure: Option<String>,
    token_store: Option<TokenStore>,
    login_attempts: AtomicUsize,
    probes: AtomicUsize,
}

impl FakeAgent {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
            logged_in: AtomicBool::new(false),
            probe_failure: Mutex::new(None),
            login_failure: None,
            token_store: None,
            login_attempts: AtomicUsize::new(0),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn logged_in(self) -> Self {
        self.set_logged_in(true);
        self
    }

    pub fn failing_probe(self, failure: ProbeFailure) -> Self {
        *self.probe_failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn failing_login(mut self, detail: &str) -> Self {
        self.login_failure = Some(detail.to_string());
        self
    }

    pub fn with_token_store(mut self, store: TokenStore) -> Self {
        self.token_store = Some(store);
        self
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::SeqCst);
    }

    pub fn login_attempts(&self) -> usize {
        self.login_attempts.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn require_login(&self) -> Result<(), AgentError> {
        if self.logged_in.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AgentError::LoginRequired)
        }
    }
}

#[async_trait]
impl SessionAgent for FakeAgent {
    async fn login(&self, username: &str, password: &SecretString) -> Result<(), AgentError> {
        self.login_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(detail) = &self.login_failure {
            return Err(AgentError::OAuth(detail.clone()));
        }
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AgentError::LoginRequired);
        }
        if username != self.username || password.expose_secret() != self.password {
            return Err(AgentError::InvalidGrant);
        }

        if let Some(store) = &self.token_store {
            let token: Token = serde_json::from_value(json!({
                "access_token": format!("access-{}", username),
                "refresh_token": "refresh",
                "token_type": "bearer",
                "expires_in": 3600
            }))
            .map_err(|e| AgentError::OAuth(e.to_string()))?;
            store.write_token(&token)?;
        }

        self.set_logged_in(true);
        Ok(())
    }

    async fn list_facilities(&self) -> Result<Vec<Facility>, AgentError> {
        self.probes.fetch_add(1, Ordering::SeqCst);

        match *self.probe_failure.lock().unwrap() {
            Some(ProbeFailure::InvalidRefreshToken) => return Err(AgentError::InvalidRefreshToken),
            Some(ProbeFailure::LoginRequired) => return Err(AgentError::LoginRequired),
            Some(ProbeFailure::Network) => {
                return Err(AgentError::OAuth("dns error: failed to lookup address".to_string()))
            }
            None => {}
        }
        self.require_login()?;

        ["SNS", "HFIR"]
            .into_iter()
            .map(|id| {
                serde_json::from_value::<Facility>(json!({
                    "id": id,
                    "name": id,
                    "type": "facility"
                }))
            })
            .collect::<Result<_, _>>()
            .map_err(|e| AgentError::OAuth(e.to_string()))
    }

    async fn list_instruments(&self, facility: &str) -> Result<Vec<Instrument>, AgentError> {
        self.require_login()?;

        let names: &[&str] = match facility {
            "SNS" => &["ARCS", "BASIS", "CNCS"],
            "HFIR" => &["IMAGING", "HB2A"],
            _ => &[],
        };
        names
            .iter()
            .map(|name| {
                serde_json::from_value::<Instrument>(json!({
                    "id": name,
                    "name": name,
                    "facility": facility
                }))
            })
            .collect::<Result<_, _>>()
            .map_err(|e| AgentError::OAuth(e.to_string()))
    }
}

/// One scripted user interaction with the login dialog
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Submit {
        username: Option<String>,
        password: String,
    },
    Cancel,
}

impl ScriptStep {
    pub fn password(password: &str) -> Self {
        Self::Submit {
            username: None,
            password: password.to_string(),
        }
    }

    pub fn credentials(username: &str, password: &str) -> Self {
        Self::Submit {
            username: Some(username.to_string()),
            password: password.to_string(),
        }
    }
}

/// Replays a fixed sequence of dialog interactions.
///
/// Like a real dialog, pressing submit with an empty field does nothing;
/// such steps are counted in `blocked_submits`. Running out of steps
/// cancels.
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    steps: VecDeque<ScriptStep>,
    pub messages: Vec<String>,
    pub prompts: usize,
    pub blocked_submits: usize,
}

impl ScriptedPrompt {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl CredentialPrompt for ScriptedPrompt {
    fn prompt(&mut self, form: &mut LoginForm, _options: &LoginOptions) -> PromptAction {
        self.prompts += 1;

        while let Some(step) = self.steps.pop_front() {
            match step {
                ScriptStep::Cancel => return PromptAction::Cancel,
                ScriptStep::Submit { username, password } => {
                    if let Some(username) = username {
                        form.set_username(username);
                    }
                    form.set_password(password);

                    if form.can_submit() {
                        return PromptAction::Submit;
                    }
                    self.blocked_submits += 1;
                }
            }
        }

        PromptAction::Cancel
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
