use oncat_auth::{AgentError, SessionAgent};
use std::sync::Arc;

use super::form::LoginForm;

pub const INVALID_CREDENTIALS_MSG: &str = "Invalid username or password. Please try again.";
pub const MISSING_CREDENTIALS_MSG: &str =
    "A username and/or password was not provided when logging in.";
pub const NO_AGENT_MSG: &str = "No Agent provided for login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    /// Dialog closed, nothing in flight
    Idle,
    AwaitingCredentials,
    Authenticating,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    InvalidCredentials,
    MissingCredentials,
    /// Any other agent failure, with its description
    Failed(String),
    NoAgent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasswordEcho {
    #[default]
    Hidden,
    Visible,
}

/// Labels and behaviour of the dialog that hosts may override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOptions {
    pub username_label: String,
    pub password_label: String,
    pub title: String,
    pub password_echo: PasswordEcho,
}

impl Default for LoginOptions {
    fn default() -> Self {
        Self {
            username_label: "UserId".to_string(),
            password_label: "Password".to_string(),
            title: "Use U/XCAM to connect to OnCat".to_string(),
            password_echo: PasswordEcho::Hidden,
        }
    }
}

/// Collects credentials and runs them through the agent.
pub struct LoginDialog<A: SessionAgent> {
    agent: Option<Arc<A>>,
    options: LoginOptions,
    form: LoginForm,
    state: LoginState,
    message: Option<String>,
    login_observers: Vec<Box<dyn FnMut(bool)>>,
}

impl<A: SessionAgent> LoginDialog<A> {
    pub fn new(agent: Option<Arc<A>>, options: LoginOptions) -> Self {
        Self::with_form(agent, options, LoginForm::for_current_user())
    }

    pub fn with_form(agent: Option<Arc<A>>, options: LoginOptions, form: LoginForm) -> Self {
        let message = if agent.is_none() {
            tracing::error!("{}", NO_AGENT_MSG);
            Some(NO_AGENT_MSG.to_string())
        } else {
            None
        };

        Self {
            agent,
            options,
            form,
            state: LoginState::Idle,
            message,
            login_observers: Vec::new(),
        }
    }

    pub fn options(&self) -> &LoginOptions {
        &self.options
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LoginForm {
        &mut self.form
    }

    pub fn state(&self) -> LoginState {
        self.state
    }

    /// Latest user-facing message, if the last step produced one.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.state == LoginState::AwaitingCredentials
    }

    /// Interactive guard: the submit action is disabled while a field is empty.
    pub fn can_submit(&self) -> bool {
        self.has_agent() && self.is_open() && self.form.can_submit()
    }

    /// Observers receive `true` after a successful login.
    pub fn on_login_status(&mut self, observer: impl FnMut(bool) + 'static) {
        self.login_observers.push(Box::new(observer));
    }

    pub fn open(&mut self) {
        if self.agent.is_none() {
            self.message = Some(NO_AGENT_MSG.to_string());
            return;
        }
        self.message = None;
        self.state = LoginState::AwaitingCredentials;
    }

    pub fn cancel(&mut self) {
        self.form.clear_password();
        self.state = LoginState::Idle;
    }

    /// Hand the current credentials to the agent.
    ///
    /// Unlike the interactive prompt, this does not check [`Self::can_submit`]:
    /// embedded callers may submit whatever the form holds and get the
    /// agent's verdict.
    pub async fn submit(&mut self) -> LoginOutcome {
        let Some(agent) = self.agent.clone() else {
            self.message = Some(NO_AGENT_MSG.to_string());
            return LoginOutcome::NoAgent;
        };

        self.state = LoginState::Authenticating;
        self.message = None;

        let result = agent
            .login(self.form.username(), self.form.password())
            .await;

        match result {
            Ok(()) => {
                tracing::info!(username = %self.form.username(), "Login succeeded");
                for observer in self.login_observers.iter_mut() {
                    observer(true);
                }
                self.form.clear();
                self.state = LoginState::Success;
                LoginOutcome::Success
            }
            Err(e) => {
                tracing::info!(username = %self.form.username(), "Login failed: {}", e);
                let outcome = match e {
                    AgentError::InvalidGrant => LoginOutcome::InvalidCredentials,
                    AgentError::LoginRequired => LoginOutcome::MissingCredentials,
                    other => LoginOutcome::Failed(other.to_string()),
                };
                self.message = Some(outcome_message(&outcome));
                self.form.clear_password();
                self.state = LoginState::AwaitingCredentials;
                outcome
            }
        }
    }
}

fn outcome_message(outcome: &LoginOutcome) -> String {
    match outcome {
        LoginOutcome::InvalidCredentials => INVALID_CREDENTIALS_MSG.to_string(),
        LoginOutcome::MissingCredentials => MISSING_CREDENTIALS_MSG.to_string(),
        LoginOutcome::NoAgent => NO_AGENT_MSG.to_string(),
        LoginOutcome::Failed(detail) => format!("Login failed: {}", detail),
        LoginOutcome::Success => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeAgent;
    use std::cell::Cell;
    use std::rc::Rc;

    fn dialog(agent: &Arc<FakeAgent>) -> LoginDialog<FakeAgent> {
        let mut dialog = LoginDialog::with_form(
            Some(Arc::clone(agent)),
            LoginOptions::default(),
            LoginForm::new("alice"),
        );
        dialog.open();
        dialog
    }

    #[test]
    fn default_options() {
        let options = LoginOptions::default();
        assert_eq!(options.username_label, "UserId");
        assert_eq!(options.password_label, "Password");
        assert_eq!(options.title, "Use U/XCAM to connect to OnCat");
        assert_eq!(options.password_echo, PasswordEcho::Hidden);
    }

    #[tokio::test]
    async fn successful_login_clears_form_and_notifies() {
        let agent = Arc::new(FakeAgent::new("alice", "secret"));
        let mut dialog = dialog(&agent);
        let notified = Rc::new(Cell::new(false));
        let flag = Rc::clone(&notified);
        dialog.on_login_status(move |ok| flag.set(ok));

        dialog.form_mut().set_password("secret");
        assert!(dialog.can_submit());

        assert_eq!(dialog.submit().await, LoginOutcome::Success);
        assert_eq!(dialog.state(), LoginState::Success);
        assert!(!dialog.is_open());
        assert!(notified.get());
        assert_eq!(dialog.form().username(), "");
        assert!(dialog.form().password_is_empty());
        assert_eq!(dialog.message(), None);
    }

    #[tokio::test]
    async fn wrong_password_reprompts() {
        let agent = Arc::new(FakeAgent::new("alice", "secret"));
        let mut dialog = dialog(&agent);
        dialog.form_mut().set_password("bad_password");

        assert_eq!(dialog.submit().await, LoginOutcome::InvalidCredentials);
        assert_eq!(dialog.message(), Some(INVALID_CREDENTIALS_MSG));
        assert!(dialog.form().password_is_empty());
        assert_eq!(dialog.form().username(), "alice");
        assert_eq!(dialog.state(), LoginState::AwaitingCredentials);
    }

    #[tokio::test]
    async fn direct_submit_with_empty_password_reports_missing_credentials() {
        let agent = Arc::new(FakeAgent::new("alice", "secret"));
        let mut dialog = dialog(&agent);
        assert!(!dialog.can_submit());

        assert_eq!(dialog.submit().await, LoginOutcome::MissingCredentials);
        assert_eq!(dialog.message(), Some(MISSING_CREDENTIALS_MSG));
        assert_eq!(dialog.state(), LoginState::AwaitingCredentials);
        assert_eq!(agent.login_attempts(), 1);
    }

    #[tokio::test]
    async fn other_failures_are_reported_not_raised() {
        let agent = Arc::new(FakeAgent::new("alice", "secret").failing_login("server unavailable"));
        let mut dialog = dialog(&agent);
        dialog.form_mut().set_password("secret");

        let outcome = dialog.submit().await;

        assert!(matches!(outcome, LoginOutcome::Failed(ref detail) if detail.contains("server unavailable")));
        assert!(dialog.message().unwrap().starts_with("Login failed:"));
        assert!(dialog.form().password_is_empty());
    }

    #[tokio::test]
    async fn without_agent_never_authenticates() {
        let mut dialog: LoginDialog<FakeAgent> =
            LoginDialog::with_form(None, LoginOptions::default(), LoginForm::new("alice"));
        assert_eq!(dialog.message(), Some(NO_AGENT_MSG));

        dialog.open();
        dialog.form_mut().set_password("secret");
        assert!(!dialog.can_submit());

        assert_eq!(dialog.submit().await, LoginOutcome::NoAgent);
        assert_eq!(dialog.state(), LoginState::Idle);
    }

    #[test]
    fn cancel_closes_and_drops_password() {
        let agent = Arc::new(FakeAgent::new("alice", "secret"));
        let mut dialog = dialog(&agent);
        dialog.form_mut().set_password("secret");

        dialog.cancel();

        assert_eq!(dialog.state(), LoginState::Idle);
        assert!(dialog.form().password_is_empty());
        assert_eq!(agent.login_attempts(), 0);
    }
}
