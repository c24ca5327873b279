use oncat_auth::{AuthError, OncatAgent, SessionAgent, Settings, TokenStore};
use std::sync::Arc;

use super::dialog::{LoginDialog, LoginOptions, LoginOutcome};
use crate::prompt::{CredentialPrompt, PromptAction};
use crate::status::{ConnectionStatus, StatusLabel};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// The probe succeeded, no dialog was shown
    AlreadyConnected,
    LoggedIn,
    Cancelled,
    NoAgent,
}

/// Connect button plus status indicator: owns the agent, the login dialog
/// and the connection status.
pub struct LoginWidget<A: SessionAgent> {
    identity_key: String,
    agent: Arc<A>,
    dialog: LoginDialog<A>,
    status: ConnectionStatus,
}

impl LoginWidget<OncatAgent> {
    /// Build the widget for `identity_key` from configuration and probe
    /// the service once.
    pub async fn new(
        identity_key: &str,
        settings: &Settings,
        options: LoginOptions,
    ) -> Result<Self, AuthError> {
        let store = TokenStore::new(identity_key)?;
        Self::with_store(identity_key, settings, &store, options).await
    }

    pub async fn with_store(
        identity_key: &str,
        settings: &Settings,
        store: &TokenStore,
        options: LoginOptions,
    ) -> Result<Self, AuthError> {
        let agent = OncatAgent::with_store(identity_key, settings, store)?;
        tracing::info!(
            identity_key,
            url = %agent.config().url,
            token_path = %store.token_path().display(),
            "ONCat agent ready"
        );
        Ok(Self::with_agent(identity_key, Arc::new(agent), options).await)
    }
}

impl<A: SessionAgent> LoginWidget<A> {
    pub async fn with_agent(identity_key: &str, agent: Arc<A>, options: LoginOptions) -> Self {
        let dialog = LoginDialog::new(Some(Arc::clone(&agent)), options);
        Self::with_dialog(identity_key, agent, dialog).await
    }

    pub async fn with_dialog(identity_key: &str, agent: Arc<A>, dialog: LoginDialog<A>) -> Self {
        let mut widget = Self {
            identity_key: identity_key.to_string(),
            agent,
            dialog,
            status: ConnectionStatus::new(),
        };
        widget.update_status().await;
        widget
    }

    /// Live agent, for hosts that make their own authenticated calls.
    pub fn agent(&self) -> Arc<A> {
        Arc::clone(&self.agent)
    }

    pub fn dialog(&self) -> &LoginDialog<A> {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut LoginDialog<A> {
        &mut self.dialog
    }

    pub fn on_connection_updated(&mut self, observer: impl FnMut(bool) + 'static) {
        self.status.subscribe(observer);
    }

    pub async fn is_connected(&self) -> bool {
        ConnectionStatus::is_connected(&*self.agent).await
    }

    pub async fn update_status(&mut self) -> bool {
        self.status.update_status(&*self.agent).await
    }

    pub fn status_label(&self) -> StatusLabel {
        self.status.label()
    }

    /// Run the interactive login unless the agent is already usable.
    ///
    /// The status is re-probed and broadcast after every login attempt and
    /// when the dialog is dismissed.
    pub async fn connect<P>(&mut self, prompt: &mut P) -> ConnectOutcome
    where
        P: CredentialPrompt + ?Sized,
    {
        if self.is_connected().await {
            return ConnectOutcome::AlreadyConnected;
        }

        tracing::info!(identity_key = %self.identity_key, "Opening login dialog");
        self.dialog.open();
        if !self.dialog.has_agent() {
            prompt.show_message(super::NO_AGENT_MSG);
            return ConnectOutcome::NoAgent;
        }

        loop {
            let action = {
                let options = self.dialog.options().clone();
                prompt.prompt(self.dialog.form_mut(), &options)
            };

            match action {
                PromptAction::Cancel => {
                    self.dialog.cancel();
                    self.update_status().await;
                    return ConnectOutcome::Cancelled;
                }
                PromptAction::Submit => {
                    let outcome = self.dialog.submit().await;
                    if let Some(message) = self.dialog.message() {
                        prompt.show_message(message);
                    }
                    self.update_status().await;

                    match outcome {
                        LoginOutcome::Success => return ConnectOutcome::LoggedIn,
                        LoginOutcome::NoAgent => return ConnectOutcome::NoAgent,
                        _ => continue,
                    }
                }
            }
        }
    }
}
